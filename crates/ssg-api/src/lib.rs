//! # SSG API
//!
//! HTTP surface: cookie-authenticated handlers, the session gate
//! middleware, page templates, and error mapping.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use render::HandlebarsRenderer;
pub use router::build_router;
pub use state::AppState;
