//! Filesystem helpers for writing store copies in place.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{JournalError, Result};

/// Pick an unused temporary path in the same directory as `destination`.
///
/// Staying in the same directory keeps the final rename on one filesystem.
pub fn temp_sibling(destination: &Path) -> Result<PathBuf> {
    let filename = destination
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| JournalError::InvalidInput("Invalid destination filename".to_string()))?;
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| JournalError::Storage(format!("System time error: {}", e)))?
        .as_nanos();

    Ok(parent.join(format!(".{}.{}.tmp", filename, nanos)))
}

/// Sync `staged` to disk and move it over `destination`.
///
/// On failure the staged file is removed, so no partial copy is left
/// beside `destination`.
pub fn commit_staged(staged: &Path, destination: &Path) -> Result<()> {
    let synced = File::open(staged).and_then(|file| file.sync_all());
    if let Err(err) = synced {
        let _ = fs::remove_file(staged);
        return Err(JournalError::Storage(format!(
            "Could not sync {}: {}",
            staged.display(),
            err
        )));
    }

    match fs::rename(staged, destination) {
        Ok(()) => Ok(()),
        // Some platforms refuse to rename over an existing file.
        Err(first) if destination.exists() => fs::remove_file(destination)
            .and_then(|()| fs::rename(staged, destination))
            .map_err(|retry| {
                let _ = fs::remove_file(staged);
                JournalError::Storage(format!(
                    "Could not replace {} (rename: {}, retry: {})",
                    destination.display(),
                    first,
                    retry
                ))
            }),
        Err(err) => {
            let _ = fs::remove_file(staged);
            Err(JournalError::Storage(format!(
                "Could not move copy to {}: {}",
                destination.display(),
                err
            )))
        }
    }
}
