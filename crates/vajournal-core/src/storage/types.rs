//! Core data types for the storage layer.
//!
//! Nothing here holds plaintext journal content: entry payloads are
//! envelope transport strings, stored and returned verbatim.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::key::DEFAULT_ITERATIONS;
use crate::error::{JournalError, Result};

/// Journal created for every new user.
pub const DEFAULT_JOURNAL: &str = "default";

/// Metadata for a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Format version (e.g., "1")
    pub format_version: String,

    /// When this store was created
    pub created_at: DateTime<Utc>,
}

/// A registered user.
#[derive(Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,

    /// Argon2id PHC string for login verification
    pub password_digest: String,

    /// Base64 per-user KDF salt; `None` means the application salt
    pub kdf_salt: Option<String>,

    /// PBKDF2 rounds fixed at registration
    pub kdf_iterations: u32,

    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_digest", &"[REDACTED]")
            .field("kdf_salt", &self.kdf_salt.is_some())
            .field("kdf_iterations", &self.kdf_iterations)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Builder for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_digest: String,
    pub kdf_salt: Option<String>,
    pub kdf_iterations: u32,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password_digest: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_digest: password_digest.into(),
            kdf_salt: None,
            kdf_iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    pub fn with_kdf_salt(mut self, salt: impl Into<String>) -> Self {
        self.kdf_salt = Some(salt.into());
        self
    }
}

/// What an entry's envelope contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Text,
    Drawing,
    Audio,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Text => "text",
            EntryKind::Drawing => "drawing",
            EntryKind::Audio => "audio",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = JournalError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(EntryKind::Text),
            "drawing" => Ok(EntryKind::Drawing),
            "audio" => Ok(EntryKind::Audio),
            other => Err(JournalError::InvalidInput(format!(
                "Unknown entry kind: {} (use text, drawing or audio)",
                other
            ))),
        }
    }
}

/// A stored entry, exactly as the store holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub id: Uuid,
    pub journal: String,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,

    /// Envelope transport form, opaque to the store
    pub payload: String,
}

/// Builder for storing a new entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub username: String,
    pub journal: String,
    pub kind: EntryKind,
    pub payload: String,

    /// Override timestamp (defaults to now)
    pub created_at: Option<DateTime<Utc>>,
}

impl NewEntry {
    pub fn new(
        username: impl Into<String>,
        journal: impl Into<String>,
        kind: EntryKind,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            journal: journal.into(),
            kind,
            payload: payload.into(),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Filter for querying entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub kind: Option<EntryKind>,

    /// Start date (inclusive)
    pub since: Option<DateTime<Utc>>,

    /// End date (inclusive)
    pub until: Option<DateTime<Utc>>,

    pub limit: Option<usize>,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn since(mut self, date: DateTime<Utc>) -> Self {
        self.since = Some(date);
        self
    }

    pub fn until(mut self, date: DateTime<Utc>) -> Self {
        self.until = Some(date);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
