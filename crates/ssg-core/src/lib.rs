//! # SSG Core
//!
//! Domain entities, repository traits, and services for the static site
//! generator: the session store, the authentication gate, accounts, posts,
//! and site generation.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
