use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vajournal_core::SecuritySettings;

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalConfig {
    pub store: StoreSection,
    #[serde(default)]
    pub account: AccountSection,
    #[serde(default)]
    pub security: SecuritySettings,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AccountSection {
    pub username: Option<String>,
    pub default_journal: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct UiSection {
    pub editor: Option<String>,
}

impl JournalConfig {
    pub fn new(store_path: PathBuf, security: SecuritySettings, editor: Option<String>) -> Self {
        Self {
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
            },
            account: AccountSection::default(),
            security,
            ui: UiSection { editor },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("journal.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<JournalConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: JournalConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    config
        .security
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid [security] in {}: {}", path.display(), e))?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &JournalConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("vajournal"));
        }
    }
    Ok(home_dir()?.join(".config").join("vajournal"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("vajournal"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("vajournal"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
