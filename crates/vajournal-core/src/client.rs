//! Journal client: accounts, session and envelope storage wired together.
//!
//! The client is the only place where plaintext and the store meet. Entries
//! are encrypted before they reach [`EnvelopeStore::insert_entry`] and
//! decrypted after [`EnvelopeStore::list_entries`] returns them.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::crypto::envelope::{self, Envelope};
use crate::crypto::key::{generate_salt, KdfParams, APP_SALT, DEFAULT_ITERATIONS, MIN_ITERATIONS};
use crate::crypto::{
    hash_password, validate_new_password, validate_password, verify_password,
    DEFAULT_MIN_PASSWORD_LENGTH,
};
use crate::error::{JournalError, Result};
use crate::session::{Session, SessionState};
use crate::storage::{EntryFilter, EntryKind, EnvelopeStore, NewEntry, NewUser, UserRecord};

/// Where the KDF salt for a new account comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaltPolicy {
    /// The shared application salt
    #[default]
    Fixed,

    /// A random salt generated at registration and kept with the user
    PerUser,
}

impl SaltPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaltPolicy::Fixed => "fixed",
            SaltPolicy::PerUser => "per_user",
        }
    }
}

impl fmt::Display for SaltPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaltPolicy {
    type Err = JournalError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fixed" => Ok(SaltPolicy::Fixed),
            "per_user" => Ok(SaltPolicy::PerUser),
            other => Err(JournalError::InvalidInput(format!(
                "Unknown salt policy: {} (use fixed or per_user)",
                other
            ))),
        }
    }
}

/// Account security settings applied at registration.
///
/// Existing accounts keep the salt and iteration count they were
/// registered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub kdf_iterations: u32,
    pub salt_policy: SaltPolicy,
    pub min_password_length: usize,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            kdf_iterations: DEFAULT_ITERATIONS,
            salt_policy: SaltPolicy::Fixed,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

impl SecuritySettings {
    /// # Errors
    ///
    /// Returns `JournalError::InvalidInput` for an iteration count below
    /// [`MIN_ITERATIONS`] or a zero minimum password length.
    pub fn validate(&self) -> Result<()> {
        if self.kdf_iterations < MIN_ITERATIONS {
            return Err(JournalError::InvalidInput(format!(
                "kdf_iterations must be at least {} (got {})",
                MIN_ITERATIONS, self.kdf_iterations
            )));
        }
        if self.min_password_length == 0 {
            return Err(JournalError::InvalidInput(
                "min_password_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// KDF parameters recorded for a user.
pub fn kdf_params_for(user: &UserRecord) -> Result<KdfParams> {
    let salt = match &user.kdf_salt {
        Some(encoded) => STANDARD
            .decode(encoded)
            .map_err(|_| JournalError::Storage("Stored KDF salt is not valid base64".to_string()))?,
        None => APP_SALT.to_vec(),
    };
    KdfParams::new(salt, user.kdf_iterations)
}

/// An entry that decrypted successfully.
///
/// The plaintext buffer is wiped on drop.
pub struct DecryptedEntry {
    pub id: Uuid,
    pub journal: String,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
    pub plaintext: Vec<u8>,
}

impl DecryptedEntry {
    /// The plaintext as UTF-8, if it is.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.plaintext).ok()
    }
}

impl Drop for DecryptedEntry {
    fn drop(&mut self) {
        self.plaintext.zeroize();
    }
}

impl fmt::Debug for DecryptedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedEntry")
            .field("id", &self.id)
            .field("journal", &self.journal)
            .field("kind", &self.kind)
            .field("created_at", &self.created_at)
            .field("plaintext_len", &self.plaintext.len())
            .finish()
    }
}

/// An entry whose envelope could not be opened.
#[derive(Debug)]
pub struct UnreadableEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
    pub reason: JournalError,
}

/// Result of reading a journal: one bad envelope never hides the rest.
#[derive(Debug, Default)]
pub struct ReadBatch {
    /// Decrypted entries, newest first
    pub entries: Vec<DecryptedEntry>,
    pub unreadable: Vec<UnreadableEntry>,
}

impl ReadBatch {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.unreadable.is_empty()
    }
}

/// Client-side journal access over an [`EnvelopeStore`].
pub struct JournalClient<S: EnvelopeStore> {
    store: S,
    session: Session,
    settings: SecuritySettings,
    username: Option<String>,
}

impl<S: EnvelopeStore> JournalClient<S> {
    pub fn new(store: S) -> Self {
        Self::with_settings(store, SecuritySettings::default())
    }

    pub fn with_settings(store: S, settings: SecuritySettings) -> Self {
        Self {
            store,
            session: Session::new(),
            settings,
            username: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &SecuritySettings {
        &self.settings
    }

    /// Logged-in username, if any.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Register an account and log it in.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidInput` for a password that fails the
    /// length policy, or `JournalError::UserExists` for a taken username.
    pub fn register(&mut self, username: &str, password: SecretString) -> Result<UserRecord> {
        self.settings.validate()?;
        validate_new_password(password.expose_secret(), self.settings.min_password_length)?;

        let digest = hash_password(password.expose_secret())?;
        let mut new_user =
            NewUser::new(username, digest).with_kdf_iterations(self.settings.kdf_iterations);
        if self.settings.salt_policy == SaltPolicy::PerUser {
            new_user = new_user.with_kdf_salt(STANDARD.encode(generate_salt()?));
        }

        let user = self.store.create_user(&new_user)?;
        tracing::info!(user_id = user.id, salt_policy = %self.settings.salt_policy, "account registered");

        self.activate(&user, password)?;
        Ok(user)
    }

    /// Verify credentials and activate the session key.
    ///
    /// A failed login leaves any current session untouched.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidCredentials` for an unknown user or a
    /// wrong password.
    pub fn login(&mut self, username: &str, password: SecretString) -> Result<()> {
        validate_password(password.expose_secret())?;

        let user = self
            .store
            .get_user(username)?
            .ok_or(JournalError::InvalidCredentials)?;
        if !verify_password(password.expose_secret(), &user.password_digest)? {
            tracing::info!("login rejected");
            return Err(JournalError::InvalidCredentials);
        }

        self.activate(&user, password)
    }

    fn activate(&mut self, user: &UserRecord, password: SecretString) -> Result<()> {
        let params = kdf_params_for(user)?;
        self.session.authenticate(password, &params)?;
        self.username = Some(user.username.clone());
        tracing::info!(user_id = user.id, "logged in");
        Ok(())
    }

    /// Discard the session key. Returns whether a session was active.
    pub fn logout(&mut self) -> bool {
        self.username = None;
        self.session.logout()
    }

    fn current_user(&self) -> Result<&str> {
        self.username.as_deref().ok_or(JournalError::NotInitialized)
    }

    pub fn journals(&self) -> Result<Vec<String>> {
        self.store.list_journals(self.current_user()?)
    }

    pub fn create_journal(&self, name: &str) -> Result<()> {
        self.store.create_journal(self.current_user()?, name)
    }

    /// Encrypt `plaintext` and store it in `journal`.
    pub fn write(&self, journal: &str, kind: EntryKind, plaintext: &[u8]) -> Result<Uuid> {
        self.write_entry(journal, kind, plaintext, None)
    }

    /// Encrypt and store a text entry.
    pub fn write_text(&self, journal: &str, text: &str) -> Result<Uuid> {
        self.write(journal, EntryKind::Text, text.as_bytes())
    }

    /// Like [`write`](Self::write), with an explicit timestamp.
    pub fn write_entry(
        &self,
        journal: &str,
        kind: EntryKind,
        plaintext: &[u8],
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Uuid> {
        let username = self.current_user()?;
        let envelope = self.session.encrypt(plaintext)?;

        let mut entry = NewEntry::new(username, journal, kind, envelope.to_transport());
        if let Some(ts) = created_at {
            entry = entry.with_created_at(ts);
        }
        self.store.insert_entry(&entry)
    }

    /// Read and decrypt a journal, newest first.
    ///
    /// Entries that fail to parse or authenticate are reported in
    /// [`ReadBatch::unreadable`]; the rest still decrypt.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotInitialized` without a session, or a store
    /// error if the listing itself fails.
    pub fn read(&self, journal: &str, filter: &EntryFilter) -> Result<ReadBatch> {
        let username = self.current_user()?;
        let key = self.session.snapshot()?;
        let stored = self.store.list_entries(username, journal, filter)?;

        let mut batch = ReadBatch::default();
        for entry in stored {
            let opened = Envelope::from_transport(&entry.payload)
                .and_then(|envelope| envelope::decrypt(&key, &envelope));
            match opened {
                Ok(plaintext) => batch.entries.push(DecryptedEntry {
                    id: entry.id,
                    journal: entry.journal,
                    kind: entry.kind,
                    created_at: entry.created_at,
                    plaintext,
                }),
                Err(reason) => {
                    tracing::warn!(id = %entry.id, error = %reason, "entry could not be read");
                    batch.unreadable.push(UnreadableEntry {
                        id: entry.id,
                        kind: entry.kind,
                        created_at: entry.created_at,
                        reason,
                    });
                }
            }
        }

        tracing::debug!(
            read = batch.entries.len(),
            unreadable = batch.unreadable.len(),
            "journal read"
        );
        Ok(batch)
    }
}

impl<S: EnvelopeStore> fmt::Debug for JournalClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JournalClient")
            .field("username", &self.username)
            .field("session", &self.session)
            .field("settings", &self.settings)
            .finish()
    }
}
