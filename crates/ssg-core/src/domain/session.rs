// ============================================================================
// SSG Core - Session Entity
// File: crates/ssg-core/src/domain/session.rs
// Description: Session records embedded in a user and the ordered list
//              operations the session store works with
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single signed-in device. Has no identity of its own beyond its token
/// and always lives inside its owner's session list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token,
            expires_at: now + ttl,
        }
    }

    /// A session whose expiry equals `now` is already expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Ordered session list of one user. Order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionList {
    sessions: Vec<Session>,
}

impl SessionList {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    /// Index of the first session carrying `token`.
    pub fn position(&self, token: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.token == token)
    }

    pub fn count_matches(&self, token: &str) -> usize {
        self.sessions.iter().filter(|s| s.token == token).count()
    }

    pub fn get(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index)
    }

    pub fn push(&mut self, session: Session) {
        self.sessions.push(session);
    }

    /// Splice out exactly the element at `index`, keeping the relative order
    /// of everything else.
    pub fn remove_at(&mut self, index: usize) -> Option<Session> {
        (index < self.sessions.len()).then(|| self.sessions.remove(index))
    }

    pub fn expired_tokens(&self, now: DateTime<Utc>) -> Vec<String> {
        self.sessions
            .iter()
            .filter(|s| s.is_expired(now))
            .map(|s| s.token.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn as_slice(&self) -> &[Session] {
        &self.sessions
    }
}

impl From<Vec<Session>> for SessionList {
    fn from(sessions: Vec<Session>) -> Self {
        Self::new(sessions)
    }
}
