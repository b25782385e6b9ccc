//! Password hashing with bcrypt and the password policy

use ssg_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least {min} bytes", min = MIN_PASSWORD_LENGTH)]
    TooShort,
    #[error("Password must be at most {max} bytes", max = MAX_PASSWORD_LENGTH)]
    TooLong,
    #[error("Hash error: {0}")]
    HashError(String),
}

impl PasswordError {
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, PasswordError::TooShort | PasswordError::TooLong)
    }
}

/// Check the length policy. bcrypt only reads the first 72 bytes, so the
/// upper bound keeps every accepted byte significant.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.len();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PasswordService {
    cost: u32,
    dummy_hash: String,
}

impl PasswordService {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        let dummy_hash = bcrypt::hash("ssg-dummy-password", cost)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Self { cost, dummy_hash })
    }

    /// Apply the policy, then hash. Policy failures never reach bcrypt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        validate_password(password)?;
        bcrypt::hash(password, self.cost).map_err(|e| PasswordError::HashError(e.to_string()))
    }

    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a bcrypt hash.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(password, hash).map_err(|e| PasswordError::HashError(e.to_string()))
    }

    /// Burn one verification against a fixed hash so callers can make the
    /// unknown-user path cost the same as a wrong password.
    pub fn verify_dummy(&self, password: &str) {
        let _ = bcrypt::verify(password, &self.dummy_hash);
    }
}
