//! # SSG Security
//!
//! Security utilities: bcrypt password hashing with the password policy,
//! and session token generation.

pub mod password;
pub mod session;

pub use password::{PasswordError, PasswordService};
pub use session::generate_session_token;
