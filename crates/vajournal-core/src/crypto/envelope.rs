//! AES-256-GCM envelope encryption.
//!
//! An [`Envelope`] is the self-contained `{nonce, ciphertext}` bundle that
//! leaves the client. Storage treats it as an opaque blob; only the key that
//! produced it can open it.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::key::SymmetricKey;
use crate::error::{JournalError, Result};

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LENGTH: usize = 12;

/// AES-GCM authentication tag length in bytes, appended to the ciphertext.
pub const TAG_LENGTH: usize = 16;

/// Authenticated ciphertext plus the nonce it was sealed under.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    nonce: [u8; NONCE_LENGTH],
    ciphertext: Vec<u8>,
}

/// Transport form written by this crate.
#[derive(Serialize)]
struct TransportOut {
    nonce: String,
    ciphertext: String,
}

/// Transport forms accepted on read. `Legacy` is the byte-array layout
/// produced by the browser client.
#[derive(Deserialize)]
#[serde(untagged)]
enum TransportIn {
    Current { nonce: String, ciphertext: String },
    Legacy { iv: Vec<u8>, data: Vec<u8> },
}

impl Envelope {
    /// Assemble an envelope from its parts.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidInput` if the ciphertext is too short
    /// to contain an authentication tag.
    pub fn from_parts(nonce: [u8; NONCE_LENGTH], ciphertext: Vec<u8>) -> Result<Self> {
        if ciphertext.len() < TAG_LENGTH {
            return Err(JournalError::InvalidInput(
                "Malformed envelope: ciphertext shorter than authentication tag".to_string(),
            ));
        }
        Ok(Self { nonce, ciphertext })
    }

    pub fn nonce(&self) -> &[u8; NONCE_LENGTH] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Bytes added to every plaintext by the construction.
    pub fn overhead() -> usize {
        TAG_LENGTH
    }

    /// Encode as the JSON transport form `{"nonce": b64, "ciphertext": b64}`.
    pub fn to_transport(&self) -> String {
        let out = TransportOut {
            nonce: STANDARD.encode(self.nonce),
            ciphertext: STANDARD.encode(&self.ciphertext),
        };
        // A struct of two strings always serializes.
        serde_json::to_string(&out).unwrap_or_default()
    }

    /// Decode either transport form.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidInput` if the value is not a well-formed
    /// envelope. The message never echoes the input.
    pub fn from_transport(value: &str) -> Result<Self> {
        let parsed: TransportIn = serde_json::from_str(value)
            .map_err(|_| malformed("unrecognized transport form"))?;

        let (nonce, ciphertext) = match parsed {
            TransportIn::Current { nonce, ciphertext } => (
                STANDARD
                    .decode(nonce.as_bytes())
                    .map_err(|_| malformed("nonce is not base64"))?,
                STANDARD
                    .decode(ciphertext.as_bytes())
                    .map_err(|_| malformed("ciphertext is not base64"))?,
            ),
            TransportIn::Legacy { iv, data } => (iv, data),
        };

        let nonce: [u8; NONCE_LENGTH] = nonce.try_into().map_err(|_| {
            malformed(&format!("nonce must be {} bytes", NONCE_LENGTH))
        })?;
        Self::from_parts(nonce, ciphertext)
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("nonce_len", &self.nonce.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

fn malformed(reason: &str) -> JournalError {
    JournalError::InvalidInput(format!("Malformed envelope: {}", reason))
}

fn cipher_for(key: &SymmetricKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Seal `plaintext` under `key` with a fresh random nonce.
///
/// Every call draws a new nonce from the OS random source, so encrypting
/// the same plaintext twice yields different envelopes.
///
/// # Errors
///
/// Returns `JournalError::Crypto` if the random source fails or the
/// plaintext exceeds what AES-GCM can seal under one nonce.
///
/// # Examples
///
/// ```
/// use vajournal_core::crypto::{decrypt, derive, encrypt};
///
/// let key = derive("correct-horse").unwrap();
/// let envelope = encrypt(&key, b"hello world").unwrap();
/// assert_eq!(decrypt(&key, &envelope).unwrap(), b"hello world");
/// ```
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Envelope> {
    let mut nonce = [0u8; NONCE_LENGTH];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| JournalError::Crypto(format!("Failed to generate nonce: {}", e)))?;

    tracing::trace!(bytes = plaintext.len(), "sealing envelope");
    let ciphertext = cipher_for(key)
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| JournalError::Crypto("Encryption failed".to_string()))?;

    Ok(Envelope { nonce, ciphertext })
}

/// Open `envelope` with `key`.
///
/// # Errors
///
/// Returns `JournalError::AuthenticationFailure` if the tag does not verify,
/// whether from tampering or from a key other than the sealing one. No
/// partial plaintext is ever returned.
pub fn decrypt(key: &SymmetricKey, envelope: &Envelope) -> Result<Vec<u8>> {
    tracing::trace!(bytes = envelope.ciphertext.len(), "opening envelope");
    cipher_for(key)
        .decrypt(Nonce::from_slice(&envelope.nonce), envelope.ciphertext.as_slice())
        .map_err(|_| JournalError::AuthenticationFailure)
}
