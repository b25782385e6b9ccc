// ============================================================================
// SSG Infrastructure - In-Memory User Store
// File: crates/ssg-infrastructure/src/memory/user_store.rs
// ============================================================================
//! Document-style store: each user record carries its own session list, the
//! same shape the PostgreSQL adapter keeps in its JSONB column. Every
//! operation touches a single entry under its shard lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use ssg_core::domain::{Session, User};
use ssg_core::error::DomainError;
use ssg_core::repositories::{SessionRepository, UserRepository};

#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.get(username).map(|u| u.clone()))
    }

    async fn insert(&self, user: &User) -> Result<(), DomainError> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(DomainError::DuplicateUsername(user.username.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<(), DomainError> {
        let mut user = self.users.get_mut(username).ok_or(DomainError::UserNotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryUserStore {
    async fn list_sessions(&self, username: &str) -> Result<Option<Vec<Session>>, DomainError> {
        Ok(self.users.get(username).map(|u| u.sessions.clone()))
    }

    async fn replace_sessions(&self, username: &str, sessions: &[Session]) -> Result<(), DomainError> {
        let mut user = self.users.get_mut(username).ok_or(DomainError::UserNotFound)?;
        user.sessions = sessions.to_vec();
        Ok(())
    }

    async fn renew_session(
        &self,
        username: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let Some(mut user) = self.users.get_mut(username) else {
            return Ok(false);
        };
        match user.sessions.iter_mut().find(|s| s.token == token) {
            Some(session) => {
                session.expires_at = expires_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_sessions(&self, username: &str, tokens: &[String]) -> Result<u64, DomainError> {
        let mut user = self.users.get_mut(username).ok_or(DomainError::UserNotFound)?;
        let before = user.sessions.len();
        user.sessions.retain(|s| !tokens.contains(&s.token));
        Ok((before - user.sessions.len()) as u64)
    }

    async fn remove_all_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut removed = 0u64;
        for mut user in self.users.iter_mut() {
            let before = user.sessions.len();
            user.sessions.retain(|s| !s.is_expired(now));
            removed += (before - user.sessions.len()) as u64;
        }
        Ok(removed)
    }

    async fn token_in_use(&self, token: &str) -> Result<bool, DomainError> {
        Ok(self
            .users
            .iter()
            .any(|u| u.sessions.iter().any(|s| s.token == token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(name: &str) -> User {
        User::new(name.into(), String::new(), "hash".into(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate() {
        let store = MemoryUserStore::new();
        store.insert(&user("alice")).await.unwrap();
        let result = store.insert(&user("alice")).await;
        assert!(matches!(result, Err(DomainError::DuplicateUsername(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_renew_leaves_other_sessions_untouched() {
        let store = MemoryUserStore::new();
        store.insert(&user("alice")).await.unwrap();
        let now = Utc::now();
        let a = Session::new("a".into(), now, Duration::minutes(1));
        let b = Session::new("b".into(), now, Duration::minutes(1));
        store.replace_sessions("alice", &[a.clone(), b.clone()]).await.unwrap();

        let later = now + Duration::hours(1);
        assert!(store.renew_session("alice", "b", later).await.unwrap());
        assert!(!store.renew_session("alice", "zzz", later).await.unwrap());
        assert!(!store.renew_session("nobody", "b", later).await.unwrap());

        let sessions = store.list_sessions("alice").await.unwrap().unwrap();
        assert_eq!(sessions[0], a);
        assert_eq!(sessions[1].expires_at, later);
    }

    #[tokio::test]
    async fn test_renew_touches_first_duplicate_only() {
        let store = MemoryUserStore::new();
        store.insert(&user("bob")).await.unwrap();
        let now = Utc::now();
        let first = Session::new("dup".into(), now, Duration::minutes(1));
        let second = Session::new("dup".into(), now, Duration::minutes(2));
        store
            .replace_sessions("bob", &[first, second.clone()])
            .await
            .unwrap();

        let later = now + Duration::minutes(5);
        assert!(store.renew_session("bob", "dup", later).await.unwrap());

        let sessions = store.list_sessions("bob").await.unwrap().unwrap();
        assert_eq!(sessions[0].expires_at, later);
        assert_eq!(sessions[1], second);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let store = MemoryUserStore::new();
        assert!(store.list_sessions("ghost").await.unwrap().is_none());
        assert!(matches!(
            store.replace_sessions("ghost", &[]).await,
            Err(DomainError::UserNotFound)
        ));
        assert!(matches!(
            store.update_password_hash("ghost", "h").await,
            Err(DomainError::UserNotFound)
        ));
    }
}
