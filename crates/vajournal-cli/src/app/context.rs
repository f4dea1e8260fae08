//! Application context for the VA Journal CLI.
//!
//! Provides a unified context that combines CLI arguments with
//! lazily-loaded configuration.

use std::io::IsTerminal;
use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use vajournal_core::storage::DEFAULT_JOURNAL;
use vajournal_core::{JournalClient, SecuritySettings, SqliteStore};

use crate::cli::Cli;
use crate::config::{read_config, JournalConfig};
use crate::errors::CliError;

use super::password::login_with_retry;
use super::resolver::{
    init_hint, missing_store_message, resolve_config_path, resolve_store_path, resolve_username,
};

/// Application context that bundles CLI args with configuration.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<JournalConfig>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Whether prompts may be shown.
    pub fn interactive(&self, no_input: bool) -> bool {
        std::io::stdin().is_terminal() && !no_input
    }

    /// The config file, if one exists, loaded once.
    pub fn config(&self) -> anyhow::Result<Option<&JournalConfig>> {
        let config = self.config.get_or_try_init(|| -> anyhow::Result<_> {
            let path = resolve_config_path()?;
            if path.exists() {
                Ok(Some(read_config(&path)?))
            } else {
                Ok(None)
            }
        })?;
        Ok(config.as_ref())
    }

    /// Security settings for new accounts.
    pub fn security_settings(&self) -> anyhow::Result<SecuritySettings> {
        Ok(self
            .config()?
            .map(|config| config.security.clone())
            .unwrap_or_default())
    }

    /// Get the configured editor override, if any.
    pub fn editor(&self) -> anyhow::Result<Option<&str>> {
        Ok(self.config()?.and_then(|config| config.ui.editor.as_deref()))
    }

    /// Journal to use when no `--journal` is given.
    pub fn journal_or_default(&self, journal: Option<&str>) -> anyhow::Result<String> {
        if let Some(name) = journal {
            return Ok(name.to_string());
        }
        Ok(self
            .config()?
            .and_then(|config| config.account.default_journal.clone())
            .unwrap_or_else(|| DEFAULT_JOURNAL.to_string()))
    }

    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        resolve_store_path(self.cli, self.config()?)
    }

    pub fn username(&self) -> anyhow::Result<String> {
        resolve_username(self.cli, self.config()?)
    }

    /// Open the existing store without logging in.
    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.store_path()?;
        if !path.exists() {
            return Err(CliError::not_found(missing_store_message(&path), init_hint()).into());
        }
        tracing::debug!(path = %path.display(), "opening journal store");
        Ok(SqliteStore::open(&path)?)
    }

    /// A client over the store, not yet logged in.
    pub fn client(&self) -> anyhow::Result<JournalClient<SqliteStore>> {
        Ok(JournalClient::with_settings(
            self.open_store()?,
            self.security_settings()?,
        ))
    }

    /// A client logged in as the resolved account.
    pub fn login(&self, no_input: bool) -> anyhow::Result<JournalClient<SqliteStore>> {
        let username = self.username()?;
        let mut client = self.client()?;
        login_with_retry(&mut client, &username, self.interactive(no_input))?;
        Ok(client)
    }
}
