//! Session repository trait (port)
//!
//! Persistence operations on a user's embedded session collection. The
//! store offers no multi-document transactions: `replace_sessions` is a
//! whole-list write, while `renew_session` and `remove_sessions` are
//! targeted updates that leave unrelated elements untouched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Session;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Sessions of `username` in stored order, `None` if the user is unknown.
    async fn list_sessions(&self, username: &str) -> Result<Option<Vec<Session>>, DomainError>;

    /// Overwrite the whole session list. `UserNotFound` if the user vanished.
    async fn replace_sessions(&self, username: &str, sessions: &[Session]) -> Result<(), DomainError>;

    /// Set `expires_at` on the first element carrying `token`, leaving every
    /// other element untouched, later duplicates included. Returns whether
    /// anything matched.
    async fn renew_session(
        &self,
        username: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Pull every element whose token is in `tokens`. Returns the number removed.
    async fn remove_sessions(&self, username: &str, tokens: &[String]) -> Result<u64, DomainError>;

    /// Remove every session with `expires_at <= now` across all users.
    async fn remove_all_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;

    async fn token_in_use(&self, token: &str) -> Result<bool, DomainError>;
}
