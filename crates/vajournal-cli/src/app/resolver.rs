//! Path and account resolution.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, JournalConfig};
use crate::constants::CONFIG_ENV;
use crate::errors::CliError;

pub const DEFAULT_JOURNAL_HINT: &str = "Run `vajournal journals` to see your journals.";

/// Resolve the config file path, checking VAJOURNAL_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Resolve the store path from CLI args or config.
pub fn resolve_store_path(cli: &Cli, config: Option<&JournalConfig>) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.store.as_deref() {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    match config {
        Some(config) => Ok(PathBuf::from(&config.store.path)),
        None => {
            let config_path = resolve_config_path()?;
            Err(CliError::not_found(
                format!("No journal store configured ({} not found)", config_path.display()),
                init_hint(),
            )
            .into())
        }
    }
}

/// Resolve the acting username from CLI args or config.
pub fn resolve_username(cli: &Cli, config: Option<&JournalConfig>) -> anyhow::Result<String> {
    let from_config = config.and_then(|c| c.account.username.as_deref());
    cli.user
        .as_deref()
        .or(from_config)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::invalid_input(
                "No account selected. Use --user NAME, set VAJOURNAL_USER, or run `vajournal register`.",
            )
            .into()
        })
}

/// Error message when the store file is missing.
pub fn missing_store_message(path: &Path) -> String {
    format!("No journal store found at {}", path.display())
}

pub fn init_hint() -> String {
    "Run:\n  vajournal init\n\nOr specify a store path:\n  VAJOURNAL_STORE=/path/to/journal.db vajournal init".to_string()
}
