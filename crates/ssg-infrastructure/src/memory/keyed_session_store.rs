// ============================================================================
// SSG Infrastructure - Keyed Session Store
// File: crates/ssg-infrastructure/src/memory/keyed_session_store.rs
// ============================================================================
//! Sessions keyed by token instead of embedded in the user record. A token
//! maps to exactly one record, so duplicate tokens cannot exist here. User
//! existence is answered by the user repository this store is paired with.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use ssg_core::domain::Session;
use ssg_core::error::DomainError;
use ssg_core::repositories::{SessionRepository, UserRepository};

#[derive(Debug, Clone)]
struct SessionRecord {
    username: String,
    expires_at: DateTime<Utc>,
    /// Insertion sequence, gives per-user listing a stable order.
    seq: u64,
}

pub struct KeyedSessionStore {
    users: Arc<dyn UserRepository>,
    sessions: DashMap<String, SessionRecord>,
    next_seq: AtomicU64,
}

impl KeyedSessionStore {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            sessions: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    async fn user_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.users.find_by_username(username).await?.is_some())
    }

    fn sessions_of(&self, username: &str) -> Vec<Session> {
        let mut owned: Vec<(u64, Session)> = self
            .sessions
            .iter()
            .filter(|r| r.username == username)
            .map(|r| {
                (
                    r.seq,
                    Session {
                        token: r.key().clone(),
                        expires_at: r.expires_at,
                    },
                )
            })
            .collect();
        owned.sort_by_key(|(seq, _)| *seq);
        owned.into_iter().map(|(_, s)| s).collect()
    }
}

#[async_trait]
impl SessionRepository for KeyedSessionStore {
    async fn list_sessions(&self, username: &str) -> Result<Option<Vec<Session>>, DomainError> {
        if !self.user_exists(username).await? {
            return Ok(None);
        }
        Ok(Some(self.sessions_of(username)))
    }

    async fn replace_sessions(&self, username: &str, sessions: &[Session]) -> Result<(), DomainError> {
        if !self.user_exists(username).await? {
            return Err(DomainError::UserNotFound);
        }

        // Whole-list semantics: anything of this user not in `sessions` goes.
        self.sessions
            .retain(|token, r| r.username != username || sessions.iter().any(|s| &s.token == token));

        for session in sessions {
            self.sessions
                .entry(session.token.clone())
                .and_modify(|r| {
                    if r.username == username {
                        r.expires_at = session.expires_at;
                    }
                })
                .or_insert_with(|| SessionRecord {
                    username: username.to_string(),
                    expires_at: session.expires_at,
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                });
        }
        Ok(())
    }

    async fn renew_session(
        &self,
        username: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        match self.sessions.get_mut(token) {
            Some(mut record) if record.username == username => {
                record.expires_at = expires_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_sessions(&self, username: &str, tokens: &[String]) -> Result<u64, DomainError> {
        let removed = tokens
            .iter()
            .filter(|t| {
                self.sessions
                    .remove_if(t.as_str(), |_, r| r.username == username)
                    .is_some()
            })
            .count();
        Ok(removed as u64)
    }

    async fn remove_all_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let before = self.sessions.len();
        self.sessions.retain(|_, r| r.expires_at > now);
        Ok(before.saturating_sub(self.sessions.len()) as u64)
    }

    async fn token_in_use(&self, token: &str) -> Result<bool, DomainError> {
        Ok(self.sessions.contains_key(token))
    }
}
