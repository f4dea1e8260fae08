//! Session key lifecycle.
//!
//! A [`Session`] owns at most one active [`SymmetricKey`]. Crypto calls take
//! a snapshot of the key and release the lock before doing any work, so a
//! concurrent logout or re-authentication never tears a key: in-flight calls
//! finish against the key they saw, later calls see the new key or
//! `NotInitialized`.
//!
//! ```text
//! NoKey --authenticate--> KeyActive --logout--> NoKey
//!                          |    ^
//!                          +----+ authenticate (replaces key)
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use secrecy::{ExposeSecret, SecretString};

use crate::crypto::envelope::{self, Envelope};
use crate::crypto::key::{derive_key, KdfParams, SymmetricKey};
use crate::error::{JournalError, Result};

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoKey,
    KeyActive,
}

/// Session-scoped holder of the active envelope key.
#[derive(Default)]
pub struct Session {
    active: RwLock<Option<Arc<SymmetricKey>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // The slot only ever holds a complete value, so a poisoned lock is safe to reuse.
    fn slot(&self) -> RwLockReadGuard<'_, Option<Arc<SymmetricKey>>> {
        self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot_mut(&self) -> RwLockWriteGuard<'_, Option<Arc<SymmetricKey>>> {
        self.active.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Derive a key from `password` and make it the active key.
    ///
    /// The password is consumed and zeroized before this returns, on every
    /// path. Derivation runs outside the lock. A failed derivation leaves
    /// the session as it was.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidInput` if the password is empty.
    pub fn authenticate(&self, password: SecretString, params: &KdfParams) -> Result<()> {
        let key = derive_key(password.expose_secret(), params)?;
        drop(password);

        let replaced = self.slot_mut().replace(Arc::new(key)).is_some();
        tracing::debug!(replaced, "session key activated");
        Ok(())
    }

    /// Discard the active key. Returns whether a key was active.
    ///
    /// The key is zeroized once the last in-flight operation holding a
    /// snapshot of it completes.
    pub fn logout(&self) -> bool {
        let previous = self.slot_mut().take();
        let was_active = previous.is_some();
        drop(previous);
        if was_active {
            tracing::debug!("session key discarded");
        }
        was_active
    }

    pub fn state(&self) -> SessionState {
        if self.slot().is_some() {
            SessionState::KeyActive
        } else {
            SessionState::NoKey
        }
    }

    /// Current key, shared with the session.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotInitialized` when no key is active.
    pub fn snapshot(&self) -> Result<Arc<SymmetricKey>> {
        self.slot().clone().ok_or(JournalError::NotInitialized)
    }

    /// Encrypt with the active key.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope> {
        let key = self.snapshot()?;
        envelope::encrypt(&key, plaintext)
    }

    /// Decrypt with the active key.
    pub fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        let key = self.snapshot()?;
        envelope::decrypt(&key, envelope)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish()
    }
}
