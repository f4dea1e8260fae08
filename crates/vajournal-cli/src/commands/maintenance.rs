use std::path::Path;

use vajournal_core::storage::EntryFilter;
use vajournal_core::{EnvelopeStore, SqliteStore};

use crate::app::AppContext;
use crate::errors::CliError;

pub fn handle_check(ctx: &AppContext, decrypt: bool, no_input: bool) -> anyhow::Result<()> {
    let client = if decrypt {
        Some(ctx.login(no_input)?)
    } else {
        None
    };
    let opened;
    let store: &SqliteStore = match client.as_ref() {
        Some(client) => client.store(),
        None => {
            opened = ctx.open_store()?;
            &opened
        }
    };

    match store.check_integrity() {
        Ok(()) => {
            if !ctx.quiet() {
                println!("Integrity check: OK");
                println!("- database pages: OK");
                println!("- foreign keys: OK");
                println!("- metadata keys: OK");
            }
        }
        Err(err) => {
            eprintln!("Integrity check: FAILED");
            eprintln!("- error: {}", err);
            eprintln!("Hint: Restore from a backup before writing new entries.");
            return Err(CliError::IntegrityFailed(err.to_string()).into());
        }
    }

    let Some(client) = client else {
        return Ok(());
    };

    let mut unreadable_total = 0;
    for journal in client.journals()? {
        let batch = client.read(&journal, &EntryFilter::new())?;
        unreadable_total += batch.unreadable.len();
        if !ctx.quiet() {
            println!(
                "- journal \"{}\": {} readable, {} unreadable",
                journal,
                batch.entries.len(),
                batch.unreadable.len()
            );
        }
        for entry in &batch.unreadable {
            eprintln!("entry {} could not be read ({})", entry.id, entry.reason);
        }
    }

    if unreadable_total > 0 {
        return Err(CliError::IntegrityFailed(format!(
            "{} entr{} could not be decrypted",
            unreadable_total,
            if unreadable_total == 1 { "y" } else { "ies" }
        ))
        .into());
    }
    Ok(())
}

/// Whether two paths name the same file, after resolving `.` and symlinks.
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

pub fn handle_backup(ctx: &AppContext, destination: &str, force: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let dest = Path::new(destination);

    if store.path().is_some_and(|path| same_file(path, dest)) {
        return Err(CliError::invalid_input("Backup destination is the store itself").into());
    }
    if dest.exists() && !force {
        return Err(CliError::invalid_input(format!(
            "{} already exists; use --force to replace it",
            dest.display()
        ))
        .into());
    }
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create backup directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }
    }

    store.backup_to(dest)?;
    if !ctx.quiet() {
        println!("Backed up journal store to {}", dest.display());
    }
    Ok(())
}
