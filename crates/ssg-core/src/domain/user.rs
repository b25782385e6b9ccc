// ============================================================================
// SSG Core - User Entity
// File: crates/ssg-core/src/domain/user.rs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::session::Session;

/// Registered author. `username` is the unique key and doubles as the
/// identity cookie value and the generated-site prefix, so it is restricted
/// to a path-safe alphabet.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    #[validate(
        length(min = 1, max = 64, message = "Username must be between 1 and 64 characters"),
        custom(function = "validate_username_chars")
    )]
    pub username: String,

    #[validate(length(max = 100, message = "Display name too long"))]
    pub display_name: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,

    /// Active sessions in insertion order.
    #[serde(default)]
    pub sessions: Vec<Session>,
}

fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !username.starts_with('.')
    {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars")
            .with_message("Username may only contain letters, digits, '_', '-' and '.'".into()))
    }
}

impl User {
    pub fn new(
        username: String,
        display_name: String,
        password_hash: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, validator::ValidationErrors> {
        let username = username.trim().to_string();
        let display_name = match display_name.trim() {
            "" => username.clone(),
            name => name.to_string(),
        };
        let user = Self {
            username,
            display_name,
            password_hash,
            created_at,
            sessions: Vec::new(),
        };
        user.validate()?;
        Ok(user)
    }

    /// Check a candidate username without building a user.
    pub fn validate_username(username: &str) -> Result<(), validator::ValidationErrors> {
        Self::new(username.to_string(), String::new(), String::new(), Utc::now()).map(|_| ())
    }
}
