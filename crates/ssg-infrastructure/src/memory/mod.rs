//! In-memory adapters
//!
//! Process-local implementations of the repository ports. The server always
//! wires PostgreSQL; these back the service and router tests.

pub mod keyed_session_store;
pub mod post_store;
pub mod user_store;

pub use keyed_session_store::KeyedSessionStore;
pub use post_store::MemoryPostStore;
pub use user_store::MemoryUserStore;
