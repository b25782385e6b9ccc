//! User repository trait (port)

use async_trait::async_trait;

use crate::domain::User;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Full user record including its sessions, `None` if absent.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Fails with `DuplicateUsername` when the username is taken.
    async fn insert(&self, user: &User) -> Result<(), DomainError>;

    /// Fails with `UserNotFound` when no row matched.
    async fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<(), DomainError>;
}
