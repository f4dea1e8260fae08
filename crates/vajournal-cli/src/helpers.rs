//! Parsing and input helpers shared by commands.

use std::io::{self, IsTerminal, Read};
use std::process::Command;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use vajournal_core::storage::EntryKind;
use zeroize::Zeroize;

use crate::errors::CliError;

pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CliError::invalid_input(format!("Invalid date value: {}", value)))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(CliError::invalid_input(format!(
        "Invalid date/time (expected ISO-8601 or YYYY-MM-DD): {}",
        value
    ))
    .into())
}

pub fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    let invalid = || {
        CliError::invalid_input(format!(
            "Invalid duration: {} (expected <number><unit>)",
            value
        ))
    };

    let (split, unit) = value.char_indices().last().ok_or_else(invalid)?;
    let num_str = &value[..split];
    if num_str.is_empty() {
        return Err(invalid().into());
    }
    let amount: i64 = num_str
        .parse()
        .map_err(|_| CliError::invalid_input(format!("Invalid duration number: {}", value)))?;
    if amount <= 0 {
        return Err(CliError::invalid_input(format!("Duration must be positive: {}", value)).into());
    }

    let duration = match unit {
        'd' => Duration::try_days(amount),
        'h' => Duration::try_hours(amount),
        'm' => Duration::try_minutes(amount),
        's' => Duration::try_seconds(amount),
        _ => {
            return Err(CliError::invalid_input(format!(
                "Invalid duration unit: {} (use d/h/m/s)",
                unit
            ))
            .into())
        }
    };
    duration.ok_or_else(|| CliError::invalid_input(format!("Duration is too large: {}", value)).into())
}

/// Entry body from `--body`, piped stdin, or the editor, in that order.
pub fn read_entry_body(
    no_input: bool,
    body: Option<String>,
    editor: Option<&str>,
) -> anyhow::Result<String> {
    if let Some(value) = body {
        if value.trim().is_empty() {
            return Err(CliError::invalid_input("--body cannot be empty").into());
        }
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        let trimmed = buffer.trim_end().to_string();
        if trimmed.is_empty() {
            return Err(CliError::invalid_input("No input provided on stdin").into());
        }
        return Ok(trimmed);
    }

    if no_input {
        return Err(CliError::invalid_input("--no-input requires --body or content from stdin").into());
    }

    read_body_from_editor(editor)
}

fn read_body_from_editor(editor: Option<&str>) -> anyhow::Result<String> {
    let editor = match editor {
        Some(value) => value.to_string(),
        None => std::env::var("EDITOR").map_err(|_| {
            CliError::invalid_input("$EDITOR is not set; use --body or pipe content via stdin")
        })?,
    };

    // Owner-only file, removed when `scratch` drops on every path.
    let scratch = tempfile::Builder::new()
        .prefix("vajournal_entry_")
        .suffix(".md")
        .tempfile()
        .map_err(|e| anyhow::anyhow!("Failed to create temp file: {}", e))?;

    let status = Command::new(editor)
        .arg(scratch.path())
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e))?;
    if !status.success() {
        return Err(anyhow::anyhow!("Editor exited with failure"));
    }

    let mut contents = std::fs::read_to_string(scratch.path())
        .map_err(|e| anyhow::anyhow!("Failed to read temp file: {}", e))?;
    drop(scratch);

    let trimmed = contents.trim_end().to_string();
    contents.zeroize();
    if trimmed.is_empty() {
        return Err(CliError::invalid_input("Entry body is empty").into());
    }

    Ok(trimmed)
}

/// File extension for a decrypted media payload, from its leading bytes.
pub fn media_extension(kind: EntryKind, bytes: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "png"),
        (b"\xff\xd8\xff", "jpg"),
        (b"GIF8", "gif"),
        (b"OggS", "ogg"),
        (b"\x1a\x45\xdf\xa3", "webm"),
        (b"ID3", "mp3"),
        (b"fLaC", "flac"),
    ];

    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" {
        match &bytes[8..12] {
            b"WAVE" => return "wav",
            b"WEBP" => return "webp",
            _ => {}
        }
    }
    for &(magic, ext) in SIGNATURES {
        if bytes.starts_with(magic) {
            return ext;
        }
    }
    match kind {
        EntryKind::Text => "txt",
        EntryKind::Drawing | EntryKind::Audio => "bin",
    }
}
