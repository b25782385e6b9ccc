//! HTTP middleware

pub mod auth;

pub(crate) use auth::admit_cookies;
pub use auth::require_session;
