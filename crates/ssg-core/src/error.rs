//! Domain errors

use ssg_security::PasswordError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,

    #[error("Username already in use: {0}")]
    DuplicateUsername(String),

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Please sign in")]
    Unauthenticated,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("New password and confirmation do not match")]
    PasswordMismatch,

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("A post with this slug already exists: {0}")]
    PostAlreadyExists(String),

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PasswordError> for DomainError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort | PasswordError::TooLong => DomainError::WeakPassword(err.to_string()),
            PasswordError::HashError(msg) => DomainError::PasswordHash(msg),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(err: validator::ValidationErrors) -> Self {
        DomainError::Validation(err.to_string())
    }
}
