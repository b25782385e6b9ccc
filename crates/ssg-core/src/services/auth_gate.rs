// ============================================================================
// SSG Core - Authentication Gate
// File: crates/ssg-core/src/services/auth_gate.rs
// ============================================================================
//! Request-level guard. Takes the claimed identity and session token from a
//! request, asks the session store, and either admits the request with a
//! [`Principal`] or rejects it with `Unauthenticated`.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::bounded;
use super::session_service::SessionService;
use crate::domain::User;
use crate::error::DomainError;
use crate::repositories::UserRepository;

/// An admitted request: the fresh user record and the token that
/// authenticated it.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub token: String,
}

impl Principal {
    pub fn username(&self) -> &str {
        &self.user.username
    }
}

pub struct AuthGate {
    sessions: Arc<SessionService>,
    users: Arc<dyn UserRepository>,
}

impl AuthGate {
    pub fn new(sessions: Arc<SessionService>, users: Arc<dyn UserRepository>) -> Self {
        Self { sessions, users }
    }

    /// Every failure, including store errors, comes back as
    /// `Unauthenticated`. The gate never retries.
    pub async fn admit(
        &self,
        identity: Option<&str>,
        token: Option<&str>,
    ) -> Result<Principal, DomainError> {
        let (username, token) = match (non_empty(identity), non_empty(token)) {
            (Some(u), Some(t)) => (u, t),
            _ => {
                debug!("Request carries no session evidence");
                return Err(DomainError::Unauthenticated);
            }
        };

        match self.sessions.validate_session(username, token).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(username = %username, "Rejected session evidence");
                return Err(DomainError::Unauthenticated);
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Session validation failed, rejecting");
                return Err(DomainError::Unauthenticated);
            }
        }

        let lookup = bounded(
            self.sessions.store_timeout(),
            "find_by_username",
            self.users.find_by_username(username),
        )
        .await;

        match lookup {
            Ok(Some(user)) => Ok(Principal {
                user,
                token: token.to_string(),
            }),
            Ok(None) => {
                warn!(username = %username, "User vanished after session validation");
                Err(DomainError::Unauthenticated)
            }
            Err(e) => {
                warn!(username = %username, error = %e, "User lookup failed, rejecting");
                Err(DomainError::Unauthenticated)
            }
        }
    }

    /// Run `operation` only for an admitted request.
    pub async fn guard<F, Fut, T>(
        &self,
        identity: Option<&str>,
        token: Option<&str>,
        operation: F,
    ) -> Result<T, DomainError>
    where
        F: FnOnce(Principal) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let principal = self.admit(identity, token).await?;
        operation(principal).await
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Session;
    use crate::repositories::{MockSessionRepository, MockUserRepository};
    use chrono::{Duration, Utc};
    use ssg_shared::ManualClock;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration as StdDuration;

    fn gate(sessions: MockSessionRepository, users: MockUserRepository) -> AuthGate {
        let service = SessionService::new(
            Arc::new(sessions),
            Arc::new(ManualClock::default()),
            Duration::minutes(5),
            StdDuration::from_secs(1),
        );
        AuthGate::new(Arc::new(service), Arc::new(users))
    }

    fn alice() -> User {
        User::new("alice".into(), "Alice".into(), "hash".into(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_evidence_never_touches_store() {
        let mut sessions = MockSessionRepository::new();
        sessions.expect_list_sessions().never();
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().never();
        let gate = gate(sessions, users);

        for (identity, token) in [
            (None, None),
            (Some("alice"), None),
            (None, Some("t")),
            (Some(""), Some("t")),
            (Some("alice"), Some("  ")),
        ] {
            let result = gate.admit(identity, token).await;
            assert!(matches!(result, Err(DomainError::Unauthenticated)));
        }
    }

    #[tokio::test]
    async fn test_store_failure_collapses_to_unauthenticated() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_list_sessions()
            .returning(|_| Err(DomainError::StoreUnavailable("down".into())));
        let gate = gate(sessions, MockUserRepository::new());

        let result = gate.admit(Some("alice"), Some("t")).await;
        assert!(matches!(result, Err(DomainError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_admits_and_runs_operation() {
        let mut sessions = MockSessionRepository::new();
        sessions.expect_list_sessions().returning(|_| {
            Ok(Some(vec![Session::new("t".into(), Utc::now(), Duration::hours(1))]))
        });
        sessions.expect_renew_session().returning(|_, _, _| Ok(true));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(alice())));
        let gate = gate(sessions, users);

        let name = gate
            .guard(Some("alice"), Some("t"), |p| async move {
                assert_eq!(p.token, "t");
                Ok(p.user.username)
            })
            .await
            .unwrap();
        assert_eq!(name, "alice");
    }

    #[tokio::test]
    async fn test_rejected_request_skips_operation() {
        let mut sessions = MockSessionRepository::new();
        sessions.expect_list_sessions().returning(|_| Ok(Some(Vec::new())));
        let gate = gate(sessions, MockUserRepository::new());

        let ran = AtomicBool::new(false);
        let result = gate
            .guard(Some("alice"), Some("t"), |_| async {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(DomainError::Unauthenticated)));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_vanished_user_is_rejected() {
        let mut sessions = MockSessionRepository::new();
        sessions.expect_list_sessions().returning(|_| {
            Ok(Some(vec![Session::new("t".into(), Utc::now(), Duration::hours(1))]))
        });
        sessions.expect_renew_session().returning(|_, _, _| Ok(true));
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        let gate = gate(sessions, users);

        let result = gate.admit(Some("alice"), Some("t")).await;
        assert!(matches!(result, Err(DomainError::Unauthenticated)));
    }
}
