//! PostgreSQL repository implementations

pub mod post_repo_impl;
pub mod user_repo_impl;

pub use post_repo_impl::PgPostRepository;
pub use user_repo_impl::PgUserRepository;

use ssg_core::error::DomainError;
use tracing::error;

pub(crate) fn store_error(context: &'static str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::StoreUnavailable(e.to_string())
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
