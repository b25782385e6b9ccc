//! # SSG Core - Domain Module
//!
//! Domain entities for the static site generator.

pub mod post;
pub mod session;
pub mod user;

pub use post::{derive_slug, is_valid_slug, Post, PostDraft};
pub use session::{Session, SessionList};
pub use user::User;
