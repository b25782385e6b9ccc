//! Application-wide constants

/// Cookie carrying the claimed identity.
pub const USER_COOKIE: &str = "user";
/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sessionid";

pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 300;
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

pub const MIN_PASSWORD_LENGTH: usize = 10;
pub const MAX_PASSWORD_LENGTH: usize = 56;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Bytes of randomness in a session token (hex encoded, so twice as many chars).
pub const SESSION_TOKEN_BYTES: usize = 32;
pub const MAX_TOKEN_ATTEMPTS: usize = 3;
