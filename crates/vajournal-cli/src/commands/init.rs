use std::path::PathBuf;

use vajournal_core::{SaltPolicy, SecuritySettings, SqliteStore};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_store_path, read_config, write_config, JournalConfig};
use crate::errors::CliError;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let store_path = match args.path.as_deref().or(ctx.cli().store.as_deref()) {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => default_store_path()?,
    };
    if store_path.exists() {
        return Err(CliError::invalid_input(format!(
            "A journal store already exists at {}",
            store_path.display()
        ))
        .into());
    }

    let config_path = resolve_config_path()?;
    let mut config = if config_path.exists() {
        read_config(&config_path)?
    } else {
        JournalConfig::new(store_path.clone(), SecuritySettings::default(), None)
    };

    let security = security_from_args(config.security.clone(), args)?;

    if let Some(parent) = store_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("Failed to create directory {}: {}", parent.display(), e)
            })?;
        }
    }
    SqliteStore::create(&store_path)?;

    config.store.path = store_path.to_string_lossy().to_string();
    config.security = security;
    if let Some(editor) = args.editor.as_deref() {
        config.ui.editor = Some(editor.to_string());
    }
    write_config(&config_path, &config)?;

    if !ctx.quiet() {
        println!("Created journal store at {}", store_path.display());
        println!("Config written to {}", config_path.display());
        println!(
            "New accounts: {} salt, {} KDF iterations",
            config.security.salt_policy, config.security.kdf_iterations
        );
        println!("\nNext:\n  vajournal register <username>");
    }
    Ok(())
}

fn security_from_args(
    mut security: SecuritySettings,
    args: &InitArgs,
) -> anyhow::Result<SecuritySettings> {
    if let Some(policy) = args.salt_policy.as_deref() {
        security.salt_policy = policy
            .parse::<SaltPolicy>()
            .map_err(|e| CliError::invalid_input(e.to_string()))?;
    }
    if let Some(iterations) = args.kdf_iterations {
        security.kdf_iterations = iterations;
    }
    security
        .validate()
        .map_err(|e| CliError::invalid_input(e.to_string()))?;
    Ok(security)
}
