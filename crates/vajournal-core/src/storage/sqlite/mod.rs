//! SQLite storage backend.
//!
//! The database file holds users, journals and entry envelopes. Entry
//! payloads are envelope transport strings; this module stores them
//! verbatim and never parses them, so the file contains no plaintext
//! journal content.

mod row;
mod validation;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use uuid::Uuid;

use crate::error::{JournalError, Result};
use crate::storage::traits::EnvelopeStore;
use crate::storage::types::{
    EntryFilter, NewEntry, NewUser, StoreMetadata, StoredEntry, UserRecord, DEFAULT_JOURNAL,
};

use row::{parse_timestamp, EntryRow, UserRow};
pub use validation::{
    check_payload, normalize_journal_name, normalize_username, MAX_NAME_CHARS, MAX_PAYLOAD_BYTES,
};

/// On-disk format version written to the `meta` table.
pub const FORMAT_VERSION: &str = "1";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_digest TEXT NOT NULL,
        kdf_salt TEXT,
        kdf_iterations INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE journals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,

        UNIQUE(user_id, name),
        FOREIGN KEY(user_id) REFERENCES users(id)
    );

    -- seq breaks ties between entries sharing a timestamp
    CREATE TABLE entries (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        journal_id INTEGER NOT NULL,
        kind TEXT NOT NULL CHECK (kind IN ('text', 'drawing', 'audio')),
        created_at TEXT NOT NULL,
        envelope TEXT NOT NULL,

        FOREIGN KEY(journal_id) REFERENCES journals(id)
    );

    CREATE INDEX entries_journal_created
    ON entries (journal_id, created_at DESC, seq DESC);
"#;

/// Fixed-width UTC timestamps, so text order matches time order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// SQLite-backed envelope store.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new store file and initialize its schema.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Storage` if the file already exists.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(JournalError::Storage(format!(
                "Store file already exists: {}",
                path.display()
            )));
        }

        let conn = Connection::open(path)?;
        let store = Self::initialize(conn, Some(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "store created");
        Ok(store)
    }

    /// Open an existing store file.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotFound` if the file is missing, or
    /// `JournalError::Storage` for an unsupported format version.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(JournalError::NotFound(format!(
                "Store file: {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::configure(&conn)?;

        let format_version: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'format_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match format_version.as_deref() {
            Some(FORMAT_VERSION) => {}
            Some(other) => {
                return Err(JournalError::Storage(format!(
                    "Unsupported store format version: {}",
                    other
                )))
            }
            None => {
                return Err(JournalError::Storage(
                    "Store metadata missing format version".to_string(),
                ))
            }
        }

        tracing::debug!(path = %path.display(), "store opened");
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Create a throwaway store that lives in memory.
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?, None)
    }

    /// Path of the backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write a consistent copy of the whole store to `dest`.
    ///
    /// The copy is written beside `dest` and renamed into place, so `dest`
    /// is either absent, its previous content, or a complete copy.
    pub fn backup_to(&self, dest: &Path) -> Result<()> {
        let temp_path = crate::fs::temp_sibling(dest)?;
        let temp_str = temp_path
            .to_str()
            .ok_or_else(|| JournalError::InvalidInput("Backup path is not UTF-8".to_string()))?;

        {
            let conn = self.lock_conn()?;
            if let Err(err) = conn.execute("VACUUM INTO ?1", [temp_str]) {
                let _ = std::fs::remove_file(&temp_path);
                return Err(err.into());
            }
        }

        crate::fs::commit_staged(&temp_path, dest)?;

        tracing::debug!(dest = %dest.display(), "store backed up");
        Ok(())
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| JournalError::Storage("SQLite connection poisoned".to_string()))
    }

    fn configure(conn: &Connection) -> Result<()> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    fn initialize(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        Self::configure(&conn)?;
        conn.execute_batch(SCHEMA)?;

        let created_at = format_timestamp(&Utc::now());
        conn.execute(
            "INSERT INTO meta (key, value) VALUES (?, ?)",
            ["format_version", FORMAT_VERSION],
        )?;
        conn.execute(
            "INSERT INTO meta (key, value) VALUES (?, ?)",
            ["created_at", &created_at],
        )?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    fn user_id(conn: &Connection, username: &str) -> Result<i64> {
        conn.query_row(
            "SELECT id FROM users WHERE username = ?",
            [username],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| JournalError::NotFound(format!("User: {}", username)))
    }

    fn journal_id(conn: &Connection, user_id: i64, name: &str) -> Result<i64> {
        conn.query_row(
            "SELECT id FROM journals WHERE user_id = ? AND name = ?",
            rusqlite::params![user_id, name],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| JournalError::NotFound(format!("Journal: {}", name)))
    }
}

impl EnvelopeStore for SqliteStore {
    fn metadata(&self) -> Result<StoreMetadata> {
        let conn = self.lock_conn()?;

        let format_version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        let created_at_str: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'created_at'",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreMetadata {
            format_version,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    fn create_user(&self, user: &NewUser) -> Result<UserRecord> {
        let username = normalize_username(&user.username)?;
        if user.password_digest.is_empty() {
            return Err(JournalError::InvalidInput(
                "Password digest cannot be empty".to_string(),
            ));
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT id FROM users WHERE username = ?",
                [&username],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(JournalError::UserExists(username));
        }

        let now = Utc::now();
        let created_at = format_timestamp(&now);
        tx.execute(
            "INSERT INTO users (username, password_digest, kdf_salt, kdf_iterations, created_at) VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![
                &username,
                &user.password_digest,
                &user.kdf_salt,
                user.kdf_iterations,
                &created_at
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                JournalError::UserExists(username.clone())
            } else {
                e.into()
            }
        })?;
        let user_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO journals (user_id, name, created_at) VALUES (?, ?, ?)",
            rusqlite::params![user_id, DEFAULT_JOURNAL, &created_at],
        )?;
        tx.commit()?;

        tracing::debug!(user_id, "user registered");
        Ok(UserRecord {
            id: user_id,
            username,
            password_digest: user.password_digest.clone(),
            kdf_salt: user.kdf_salt.clone(),
            kdf_iterations: user.kdf_iterations,
            created_at: parse_timestamp(&created_at)?,
        })
    }

    fn get_user(&self, username: &str) -> Result<Option<UserRecord>> {
        let username = username.trim();
        let conn = self.lock_conn()?;

        let row = conn
            .query_row(
                "SELECT id, username, password_digest, kdf_salt, kdf_iterations, created_at FROM users WHERE username = ?",
                [username],
                UserRow::from_row,
            )
            .optional()?;

        row.map(UserRecord::try_from).transpose()
    }

    fn create_journal(&self, username: &str, name: &str) -> Result<()> {
        let name = normalize_journal_name(name)?;
        let conn = self.lock_conn()?;
        let user_id = Self::user_id(&conn, username.trim())?;

        let created_at = format_timestamp(&Utc::now());
        conn.execute(
            "INSERT INTO journals (user_id, name, created_at) VALUES (?, ?, ?)",
            rusqlite::params![user_id, &name, &created_at],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                JournalError::JournalExists(name.clone())
            } else {
                e.into()
            }
        })?;

        tracing::debug!(user_id, "journal created");
        Ok(())
    }

    fn list_journals(&self, username: &str) -> Result<Vec<String>> {
        let conn = self.lock_conn()?;
        let user_id = Self::user_id(&conn, username.trim())?;

        let mut stmt = conn.prepare("SELECT name FROM journals WHERE user_id = ? ORDER BY id")?;
        let names = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn insert_entry(&self, entry: &NewEntry) -> Result<Uuid> {
        check_payload(&entry.payload)?;
        let journal = normalize_journal_name(&entry.journal)?;

        let conn = self.lock_conn()?;
        let user_id = Self::user_id(&conn, entry.username.trim())?;
        let journal_id = Self::journal_id(&conn, user_id, &journal)?;

        let id = Uuid::now_v7();
        let created_at = format_timestamp(&entry.created_at.unwrap_or_else(Utc::now));
        conn.execute(
            "INSERT INTO entries (id, journal_id, kind, created_at, envelope) VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![
                id.to_string(),
                journal_id,
                entry.kind.as_str(),
                &created_at,
                &entry.payload
            ],
        )?;

        tracing::debug!(%id, kind = %entry.kind, bytes = entry.payload.len(), "entry stored");
        Ok(id)
    }

    fn list_entries(
        &self,
        username: &str,
        journal: &str,
        filter: &EntryFilter,
    ) -> Result<Vec<StoredEntry>> {
        let journal = normalize_journal_name(journal)?;
        let conn = self.lock_conn()?;
        let user_id = Self::user_id(&conn, username.trim())?;
        let journal_id = Self::journal_id(&conn, user_id, &journal)?;

        let mut conditions: Vec<String> = vec!["e.journal_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(journal_id)];

        if let Some(kind) = filter.kind {
            conditions.push("e.kind = ?".to_string());
            params.push(Box::new(kind.as_str()));
        }

        if let Some(since) = filter.since {
            conditions.push("e.created_at >= ?".to_string());
            params.push(Box::new(format_timestamp(&since)));
        }

        if let Some(until) = filter.until {
            conditions.push("e.created_at <= ?".to_string());
            params.push(Box::new(format_timestamp(&until)));
        }

        let mut query = String::from(
            "SELECT e.id, j.name, e.kind, e.created_at, e.envelope FROM entries e JOIN journals j ON j.id = e.journal_id",
        );
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
        query.push_str(" ORDER BY e.created_at DESC, e.seq DESC");

        if let Some(limit) = filter.limit {
            query.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            EntryRow::from_row,
        )?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(StoredEntry::try_from(row?)?);
        }
        Ok(entries)
    }

    fn check_integrity(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let status: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if status != "ok" {
            return Err(JournalError::Storage(format!(
                "Database integrity check failed: {}",
                status
            )));
        }

        let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
        let mut rows = stmt.query([])?;
        if rows.next()?.is_some() {
            return Err(JournalError::Storage(
                "Foreign key integrity check failed".to_string(),
            ));
        }

        let metadata_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meta WHERE key IN ('format_version', 'created_at')",
            [],
            |row| row.get(0),
        )?;
        if metadata_count < 2 {
            return Err(JournalError::Storage(
                "Metadata table missing required keys".to_string(),
            ));
        }

        Ok(())
    }
}
