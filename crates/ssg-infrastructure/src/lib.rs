//! # SSG Infrastructure
//!
//! Adapters for the core ports: PostgreSQL repositories, in-memory stores,
//! and the local-disk static host.

pub mod database;
pub mod host;
pub mod memory;

pub use database::{create_pool, run_migrations, PgPostRepository, PgUserRepository};
pub use host::LocalHost;
pub use memory::{KeyedSessionStore, MemoryPostStore, MemoryUserStore};
