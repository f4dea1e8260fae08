//! Error types for VA Journal core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps them to
//! user-facing messages and exit codes. No variant ever carries plaintext,
//! password, or key bytes.

use thiserror::Error;

/// Result type alias for journal operations.
pub type Result<T> = std::result::Result<T, JournalError>;

/// Core error type for journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Invalid caller input (empty password, malformed envelope, bad name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A crypto operation was attempted with no active session key
    #[error("Session is not initialized; please log in")]
    NotInitialized,

    /// AEAD tag verification failed (wrong key or tampered envelope)
    #[error("Entry could not be authenticated")]
    AuthenticationFailure,

    /// Unknown username or password digest mismatch
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Username already registered
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Journal name already used by this user
    #[error("Journal already exists: {0}")]
    JournalExists(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cryptographic primitive failure other than authentication
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl JournalError {
    /// Whether the caller should ask the user for credentials.
    pub fn needs_credentials(&self) -> bool {
        matches!(
            self,
            JournalError::NotInitialized | JournalError::InvalidCredentials
        )
    }
}
