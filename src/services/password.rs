//! Password hashing for user registration and login.
//!
//! Stored values are Argon2id PHC strings (`$argon2id$v=19$...`), so the
//! parameters and salt travel with the hash.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};
use std::sync::OnceLock;

use thiserror::Error;

// Upper bound on accepted input, keeps a single hash from eating the CPU.
pub const MAX_PASSWORD_LENGTH: usize = 512;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password exceeds {MAX_PASSWORD_LENGTH} bytes")]
    TooLong,
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),
    #[error("password hashing task failed")]
    Join(#[from] tokio::task::JoinError),
}

pub fn hash(password: &str) -> Result<String, PasswordError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;

    Ok(hash.to_string())
}

/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
///
/// Over-long input never matches and is refused before any Argon2 work.
pub fn verify(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Ok(false);
    }
    let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e)),
    }
}

static ABSENT_USER_HASH: OnceLock<String> = OnceLock::new();

/// Runs the same Argon2 verification a real login would, against a hash no
/// password was ever registered with. Always `Ok(false)`.
///
/// Unknown user names then cost as much as wrong passwords.
pub fn verify_absent(password: &str) -> Result<bool, PasswordError> {
    let stored = match ABSENT_USER_HASH.get() {
        Some(stored) => stored,
        None => {
            let fresh = hash(&uuid::Uuid::new_v4().to_string())?;
            ABSENT_USER_HASH.get_or_init(|| fresh)
        }
    };
    verify(password, stored).map(|_| false)
}

// Argon2 is deliberately slow; keep it off the async worker threads.
pub async fn hash_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash(&password)).await?
}

pub async fn verify_blocking(password: String, stored_hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify(&password, &stored_hash)).await?
}

pub async fn verify_absent_blocking(password: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_absent(&password)).await?
}
