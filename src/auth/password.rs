//! Argon2 password hashing.
//!
//! Hashes are stored in PHC string format, so parameters and salt travel
//! with the hash. Both functions are CPU-bound; async callers run them on
//! the blocking pool.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{AppError, AppResult};

pub fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hash failed: {}", e)))?
        .to_string();
    Ok(hash)
}

/// Check `plain` against a stored hash. An unparseable stored hash is
/// corrupt state, not a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::CorruptState(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
