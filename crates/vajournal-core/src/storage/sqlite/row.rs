//! Row types for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{JournalError, Result};
use crate::storage::types::{EntryKind, StoredEntry, UserRecord};

/// Raw row data from the entries table, before parsing into domain types.
#[derive(Debug)]
pub struct EntryRow {
    pub id: String,
    pub journal: String,
    pub kind: String,
    pub created_at: String,
    pub envelope: String,
}

impl EntryRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            journal: row.get(1)?,
            kind: row.get(2)?,
            created_at: row.get(3)?,
            envelope: row.get(4)?,
        })
    }
}

impl TryFrom<EntryRow> for StoredEntry {
    type Error = JournalError;

    fn try_from(row: EntryRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| JournalError::Storage(format!("Invalid entry UUID: {}", e)))?;
        let kind: EntryKind = row
            .kind
            .parse()
            .map_err(|_| JournalError::Storage(format!("Invalid entry kind: {}", row.kind)))?;
        let created_at = parse_timestamp(&row.created_at)?;

        Ok(StoredEntry {
            id,
            journal: row.journal,
            kind,
            created_at,
            payload: row.envelope,
        })
    }
}

/// Raw row data from the users table.
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_digest: String,
    pub kdf_salt: Option<String>,
    pub kdf_iterations: i64,
    pub created_at: String,
}

impl UserRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            password_digest: row.get(2)?,
            kdf_salt: row.get(3)?,
            kdf_iterations: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl TryFrom<UserRow> for UserRecord {
    type Error = JournalError;

    fn try_from(row: UserRow) -> Result<Self> {
        let kdf_iterations = u32::try_from(row.kdf_iterations).map_err(|_| {
            JournalError::Storage(format!("Invalid KDF iteration count: {}", row.kdf_iterations))
        })?;
        Ok(UserRecord {
            id: row.id,
            username: row.username,
            password_digest: row.password_digest,
            kdf_salt: row.kdf_salt,
            kdf_iterations,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| JournalError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}
