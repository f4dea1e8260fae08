//! # VA Journal Core
//!
//! Core library for VA Journal - a private, encrypted-at-rest journal for
//! text, drawings and audio recordings.
//!
//! Entries are encrypted on the client with a key derived from the user's
//! password; the store only ever holds opaque envelopes.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, envelope codec, login digests
//! - **session**: the active key and its lifecycle
//! - **storage**: content-blind envelope store trait and SQLite backend
//! - **client**: registration, login, encrypted writes and reads

pub mod client;
pub mod crypto;
pub mod error;
mod fs;
pub mod session;
pub mod storage;

pub use client::{
    DecryptedEntry, JournalClient, ReadBatch, SaltPolicy, SecuritySettings, UnreadableEntry,
};
pub use error::{JournalError, Result};
pub use session::{Session, SessionState};
pub use storage::{EnvelopeStore, SqliteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
