//! # SSG Shared
//!
//! Configuration, telemetry, clock, and constants shared by every crate of
//! the static site generator.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::AppError;
