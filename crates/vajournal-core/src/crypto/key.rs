//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! This module turns a password into the 256-bit AES-GCM key used for
//! journal envelopes. Derivation is deliberately slow so that a captured
//! envelope cannot be cheaply brute-forced offline.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{JournalError, Result};

/// Application-wide salt used when a user has no salt of their own.
///
/// Every user sharing a password derives the same key under this salt.
pub const APP_SALT: &[u8] = b"VAjournal-salt";

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Lowest iteration count accepted by [`KdfParams::new`].
pub const MIN_ITERATIONS: u32 = 100_000;

/// Length of salts produced by [`generate_salt`].
pub const SALT_LENGTH: usize = 16;

const MIN_SALT_LENGTH: usize = 8;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256-GCM).
pub const KEY_LENGTH: usize = 32;

/// A symmetric key derived from a password.
///
/// Key material is zeroized from memory when dropped. The type is not
/// `Clone`; sessions share it behind an `Arc` so exactly one copy exists.
#[derive(ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: [u8; KEY_LENGTH],
}

impl SymmetricKey {
    /// Create a key from raw bytes.
    ///
    /// # Security
    ///
    /// The caller is responsible for ensuring the bytes come from a secure source.
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Salt and work factor for a derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    salt: Vec<u8>,
    iterations: u32,
}

impl KdfParams {
    /// The fixed application salt with the default iteration count.
    pub fn application() -> Self {
        Self {
            salt: APP_SALT.to_vec(),
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Build custom parameters.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidInput` if the salt is shorter than
    /// 8 bytes or the iteration count is below [`MIN_ITERATIONS`].
    pub fn new(salt: impl Into<Vec<u8>>, iterations: u32) -> Result<Self> {
        let salt = salt.into();
        if salt.len() < MIN_SALT_LENGTH {
            return Err(JournalError::InvalidInput(format!(
                "Salt must be at least {} bytes",
                MIN_SALT_LENGTH
            )));
        }
        if iterations < MIN_ITERATIONS {
            return Err(JournalError::InvalidInput(format!(
                "KDF iterations must be at least {} (got {})",
                MIN_ITERATIONS, iterations
            )));
        }
        Ok(Self { salt, iterations })
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::application()
    }
}

/// Derive a key from a password with the application parameters.
///
/// # Examples
///
/// ```
/// use vajournal_core::crypto::derive;
///
/// let key = derive("correct-horse").unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive(password: &str) -> Result<SymmetricKey> {
    derive_key(password, &KdfParams::application())
}

/// Derive a key from a password with explicit parameters.
///
/// # Security
///
/// - Same password + params always produces the same key (deterministic)
/// - The password is only borrowed; nothing here retains it
///
/// # Errors
///
/// Returns `JournalError::InvalidInput` if the password is empty.
pub fn derive_key(password: &str, params: &KdfParams) -> Result<SymmetricKey> {
    if password.is_empty() {
        return Err(JournalError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        &params.salt,
        params.iterations,
        &mut key_bytes,
    );
    let key = SymmetricKey::from_bytes(key_bytes);
    key_bytes.zeroize();

    Ok(key)
}

/// Generate a random per-user salt.
///
/// # Errors
///
/// Returns `JournalError::Crypto` if the OS random source is unavailable.
pub fn generate_salt() -> Result<[u8; SALT_LENGTH]> {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt)
        .map_err(|e| JournalError::Crypto(format!("Failed to generate salt: {}", e)))?;
    Ok(salt)
}
