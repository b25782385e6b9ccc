//! Domain services (business logic)

pub mod account_service;
pub mod auth_gate;
pub mod post_service;
pub mod session_service;
pub mod session_sweeper;
pub mod site_generator;

pub use account_service::AccountService;
pub use auth_gate::{AuthGate, Principal};
pub use post_service::PostService;
pub use session_service::SessionService;
pub use session_sweeper::SessionSweeper;
pub use site_generator::{IndexView, PageRenderer, PostView, SiteGenerator, StaticHost};

use std::future::Future;
use std::time::Duration;

use tracing::error;

use crate::error::DomainError;

/// Run one persistence call under `limit`. Elapsing it yields
/// `StoreUnavailable`.
pub(crate) async fn bounded<T, F>(limit: Duration, op: &'static str, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Err(DomainError::StoreUnavailable(reason))) => {
            error!(op, %reason, "Session store call failed");
            Err(DomainError::StoreUnavailable(reason))
        }
        Ok(result) => result,
        Err(_) => {
            error!(op, timeout_ms = limit.as_millis() as u64, "Session store call timed out");
            Err(DomainError::StoreUnavailable(format!(
                "{} timed out after {}ms",
                op,
                limit.as_millis()
            )))
        }
    }
}
