//! Static hosting backends

pub mod local;

pub use local::LocalHost;
