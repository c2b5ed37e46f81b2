use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),
    #[error("Password verification failed: {0}")]
    Verify(String),
}

/// Hash a plain-text password for storage.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash(password, DEFAULT_COST).map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a plain-text password against a stored bcrypt hash.
///
/// Returns `Ok(false)` on a mismatch; `Err` only when the stored hash is
/// unreadable.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, PasswordError> {
    verify(password, hashed).map_err(|e| PasswordError::Verify(e.to_string()))
}
