//! Envelope store trait definition.
//!
//! The `EnvelopeStore` trait is the boundary between the client-side crypto
//! and persistence. Implementations keep users, journals and opaque entry
//! payloads; they never see keys or plaintext.

use uuid::Uuid;

use super::types::{EntryFilter, NewEntry, NewUser, StoreMetadata, StoredEntry, UserRecord};
use crate::error::Result;

/// Storage interface for content-blind envelope persistence.
///
/// All implementations must ensure:
/// - Entry payloads are stored and returned byte-for-byte
/// - No payload field is inspected, indexed, or modified
/// - Entries are listed newest first
pub trait EnvelopeStore: Send + Sync {
    /// Get store metadata.
    fn metadata(&self) -> Result<StoreMetadata>;

    // --- Users ---

    /// Register a user together with their default journal.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::UserExists` if the username is taken, or
    /// `JournalError::InvalidInput` if it is empty.
    fn create_user(&self, user: &NewUser) -> Result<UserRecord>;

    /// Look up a user by name.
    fn get_user(&self, username: &str) -> Result<Option<UserRecord>>;

    // --- Journals ---

    /// Create a named journal for a user.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::JournalExists` for a duplicate name,
    /// `JournalError::NotFound` for an unknown user, or
    /// `JournalError::InvalidInput` for an unusable name.
    fn create_journal(&self, username: &str, name: &str) -> Result<()>;

    /// List a user's journal names in creation order.
    fn list_journals(&self, username: &str) -> Result<Vec<String>>;

    // --- Entries ---

    /// Store an entry payload.
    ///
    /// # Returns
    ///
    /// Returns the ID of the stored entry.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotFound` if the journal does not exist.
    fn insert_entry(&self, entry: &NewEntry) -> Result<Uuid>;

    /// List entries of one journal matching the filter, newest first.
    fn list_entries(
        &self,
        username: &str,
        journal: &str,
        filter: &EntryFilter,
    ) -> Result<Vec<StoredEntry>>;

    // --- Maintenance ---

    /// Check store integrity.
    ///
    /// Verifies:
    /// - Database page consistency
    /// - Foreign key relationships
    /// - Required metadata keys
    fn check_integrity(&self) -> Result<()>;
}
