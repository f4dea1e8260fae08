//! Cryptographic operations for VA Journal.
//!
//! This module provides key derivation and envelope encryption using
//! well-audited libraries:
//! - **PBKDF2-HMAC-SHA256**: password to 256-bit key
//! - **AES-256-GCM**: authenticated envelope encryption
//! - **Argon2id**: login digests kept by the store
//!
//! ## Security Model
//!
//! - Keys are derived client-side and never leave process memory
//! - Every envelope gets a fresh random 96-bit nonce
//! - Key material is zeroized on drop
//! - No plaintext passwords are stored
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft or inspection of the envelope store
//! - Tampering with stored envelopes
//!
//! We do NOT defend against:
//! - Compromised client / keylogger
//! - Password loss (there is no recovery)

pub mod credential;
pub mod envelope;
pub mod key;
pub mod password;

#[cfg(test)]
mod proptests;

pub use credential::{hash_password, verify_password};
pub use envelope::{decrypt, encrypt, Envelope, NONCE_LENGTH, TAG_LENGTH};
pub use key::{derive, derive_key, generate_salt, KdfParams, SymmetricKey, APP_SALT};
pub use password::{validate_new_password, validate_password, DEFAULT_MIN_PASSWORD_LENGTH};
