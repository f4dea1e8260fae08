//! Content-blind persistence for users, journals and entry envelopes.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStore;
pub use traits::EnvelopeStore;
pub use types::{
    EntryFilter, EntryKind, NewEntry, NewUser, StoreMetadata, StoredEntry, UserRecord,
    DEFAULT_JOURNAL,
};
