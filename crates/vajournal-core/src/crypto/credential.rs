//! Password digests for login verification.
//!
//! The store keeps an Argon2id PHC string per user. The digest is
//! independent of the envelope key: it proves the password at login and
//! nothing more.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{JournalError, Result};

/// Argon2id parameters for credential digests.
///
/// - Memory: 19 MB (19 * 1024 KB)
/// - Iterations: 2
/// - Parallelism: 1
const ARGON2_MEMORY_KB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

const DIGEST_SALT_LENGTH: usize = 16;

fn hasher() -> Result<Argon2<'static>> {
    let params = argon2::Params::new(
        ARGON2_MEMORY_KB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        None,
    )
    .map_err(|e| JournalError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Produce an irreversible digest of `password` for storage.
///
/// A fresh random salt is embedded in the returned PHC string.
///
/// # Errors
///
/// Returns `JournalError::Crypto` if salt generation or hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; DIGEST_SALT_LENGTH];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| JournalError::Crypto(format!("Failed to generate salt: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| JournalError::Crypto(format!("Failed to encode salt: {}", e)))?;

    let digest = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| JournalError::Crypto(format!("Password hashing failed: {}", e)))?;
    Ok(digest.to_string())
}

/// Check `password` against a stored digest.
///
/// # Errors
///
/// Returns `JournalError::Storage` if the stored digest is not a valid
/// PHC string. A wrong password is `Ok(false)`, not an error.
pub fn verify_password(password: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| JournalError::Storage(format!("Invalid password digest: {}", e)))?;
    Ok(hasher()?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
