// ============================================================================
// SSG Core - Session Service
// File: crates/ssg-core/src/services/session_service.rs
// ============================================================================
//! Session store: create, validate (with sliding renewal), invalidate and
//! prune the sessions embedded in a user's record.
//!
//! The backing store has no transactions. Renewal and pruning use targeted
//! updates; expired-session removal and invalidation rewrite the whole list
//! and can lose a concurrent write to the same user.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use ssg_shared::constants::MAX_TOKEN_ATTEMPTS;
use ssg_shared::Clock;
use tracing::{debug, info, warn};

use super::bounded;
use crate::domain::{Session, SessionList};
use crate::error::DomainError;
use crate::repositories::SessionRepository;

type TokenSource = Arc<dyn Fn() -> String + Send + Sync>;

pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    store_timeout: StdDuration,
    token_source: TokenSource,
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        store_timeout: StdDuration,
    ) -> Self {
        Self {
            sessions,
            clock,
            ttl,
            store_timeout,
            token_source: Arc::new(ssg_security::generate_session_token),
        }
    }

    /// Replace the token generator.
    pub fn with_token_source(mut self, source: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.token_source = Arc::new(source);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store_timeout(&self) -> StdDuration {
        self.store_timeout
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Issue a new session for `username` and return its token.
    pub async fn create_session(&self, username: &str) -> Result<String, DomainError> {
        // 1. Load the current list
        let mut list = self.load(username).await?.ok_or(DomainError::UserNotFound)?;

        // 2. Pick a token nobody holds
        let token = self.fresh_token().await?;

        // 3. Append and persist the whole list
        let now = self.clock.now();
        list.push(Session::new(token.clone(), now, self.ttl));
        bounded(
            self.store_timeout,
            "replace_sessions",
            self.sessions.replace_sessions(username, list.as_slice()),
        )
        .await?;

        info!(username = %username, active = list.len(), "Session created");

        // 4. Opportunistic cleanup; sign-in already succeeded
        if let Err(e) = self.prune_expired(username).await {
            warn!(username = %username, error = %e, "Pruning after sign-in failed");
        }

        Ok(token)
    }

    /// `Ok(true)` and a renewed expiry when `token` is a live session of
    /// `username`. Unknown users and tokens are `Ok(false)`; an expired match
    /// is removed and reported as `Ok(false)`.
    pub async fn validate_session(&self, username: &str, token: &str) -> Result<bool, DomainError> {
        let Some(list) = self.load(username).await? else {
            debug!(username = %username, "Session check for unknown user");
            return Ok(false);
        };

        let Some(index) = list.position(token) else {
            debug!(username = %username, "Session not found");
            return Ok(false);
        };

        if list.count_matches(token) > 1 {
            warn!(username = %username, "Duplicate session token in user record, using first match");
        }

        let now = self.clock.now();
        let expired = list.get(index).is_some_and(|s| s.is_expired(now));

        if expired {
            let mut list = list;
            list.remove_at(index);
            bounded(
                self.store_timeout,
                "replace_sessions",
                self.sessions.replace_sessions(username, list.as_slice()),
            )
            .await?;
            warn!(username = %username, "Session expired, removed");
            return Ok(false);
        }

        let renewed = bounded(
            self.store_timeout,
            "renew_session",
            self.sessions.renew_session(username, token, now + self.ttl),
        )
        .await?;

        if !renewed {
            debug!(username = %username, "Session vanished before renewal");
        }
        Ok(renewed)
    }

    /// Remove exactly the session holding `token`.
    pub async fn invalidate_session(&self, username: &str, token: &str) -> Result<(), DomainError> {
        let mut list = self.load(username).await?.ok_or(DomainError::UserNotFound)?;
        let index = list.position(token).ok_or(DomainError::SessionNotFound)?;

        list.remove_at(index);
        bounded(
            self.store_timeout,
            "replace_sessions",
            self.sessions.replace_sessions(username, list.as_slice()),
        )
        .await?;

        info!(username = %username, remaining = list.len(), "Session invalidated");
        Ok(())
    }

    /// Drop every expired session of `username` in one targeted removal.
    pub async fn prune_expired(&self, username: &str) -> Result<u64, DomainError> {
        let list = self.load(username).await?.ok_or(DomainError::UserNotFound)?;
        let expired = list.expired_tokens(self.clock.now());
        if expired.is_empty() {
            return Ok(0);
        }

        let removed = bounded(
            self.store_timeout,
            "remove_sessions",
            self.sessions.remove_sessions(username, &expired),
        )
        .await?;

        debug!(username = %username, removed, "Pruned expired sessions");
        Ok(removed)
    }

    /// Drop expired sessions of every user.
    pub async fn prune_all_expired(&self) -> Result<u64, DomainError> {
        bounded(
            self.store_timeout,
            "remove_all_expired",
            self.sessions.remove_all_expired(self.clock.now()),
        )
        .await
    }

    async fn load(&self, username: &str) -> Result<Option<SessionList>, DomainError> {
        let sessions = bounded(
            self.store_timeout,
            "list_sessions",
            self.sessions.list_sessions(username),
        )
        .await?;
        Ok(sessions.map(SessionList::from))
    }

    async fn fresh_token(&self) -> Result<String, DomainError> {
        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let token = (self.token_source)();
            let taken = bounded(
                self.store_timeout,
                "token_in_use",
                self.sessions.token_in_use(&token),
            )
            .await?;
            if !taken {
                return Ok(token);
            }
            warn!(attempt, "Generated session token already in use, regenerating");
        }
        Err(DomainError::TokenGeneration(format!(
            "no unused token after {} attempts",
            MAX_TOKEN_ATTEMPTS
        )))
    }
}
