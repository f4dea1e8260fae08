//! Terminal styling and JSON shapes for command output.

use std::io::IsTerminal;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use owo_colors::OwoColorize;
use vajournal_core::storage::EntryKind;
use vajournal_core::{DecryptedEntry, UnreadableEntry};

/// Color is used only on a terminal, and never with NO_COLOR or TERM=dumb.
fn color_enabled(is_tty: bool) -> bool {
    let term_is_dumb = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
    let no_color_env = std::env::var("NO_COLOR").is_ok();
    is_tty && !no_color_env && !term_is_dumb
}

pub fn stdout_color() -> bool {
    color_enabled(std::io::stdout().is_terminal())
}

pub fn stderr_color() -> bool {
    color_enabled(std::io::stderr().is_terminal())
}

pub fn print_error(err: &anyhow::Error) {
    if stderr_color() {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
    } else {
        eprintln!("Error: {:#}", err);
    }
}

pub fn print_warning(message: &str) {
    if stderr_color() {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    } else {
        eprintln!("warning: {}", message);
    }
}

/// Header line shown above each entry.
pub fn entry_heading(entry: &DecryptedEntry, color: bool) -> String {
    let when = entry.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let meta = format!("{} \u{b7} {}", entry.kind, entry.id);
    if color {
        format!("{}  {}", when.bold(), meta.dimmed())
    } else {
        format!("{}  {}", when, meta)
    }
}

pub fn entry_json(entry: &DecryptedEntry) -> serde_json::Value {
    let mut value = serde_json::json!({
        "id": entry.id,
        "journal": entry.journal,
        "kind": entry.kind,
        "created_at": entry.created_at,
        "size": entry.plaintext.len(),
    });
    match (entry.kind, entry.as_text()) {
        (EntryKind::Text, Some(text)) => value["text"] = serde_json::Value::from(text),
        _ => value["data_base64"] = serde_json::Value::from(STANDARD.encode(&entry.plaintext)),
    }
    value
}

pub fn unreadable_json(entry: &UnreadableEntry) -> serde_json::Value {
    serde_json::json!({
        "id": entry.id,
        "kind": entry.kind,
        "created_at": entry.created_at,
        "error": entry.reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn entry(kind: EntryKind, plaintext: &[u8]) -> DecryptedEntry {
        DecryptedEntry {
            id: Uuid::nil(),
            journal: "default".to_string(),
            kind,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
            plaintext: plaintext.to_vec(),
        }
    }

    #[test]
    fn test_text_entry_json() {
        let value = entry_json(&entry(EntryKind::Text, b"hello"));
        assert_eq!(value["text"], "hello");
        assert_eq!(value["kind"], "text");
        assert_eq!(value["size"], 5);
        assert!(value.get("data_base64").is_none());
    }

    #[test]
    fn test_media_entry_json_is_base64() {
        let value = entry_json(&entry(EntryKind::Audio, &[0xff, 0x00]));
        assert_eq!(value["data_base64"], "/wA=");
        assert!(value.get("text").is_none());
    }

    #[test]
    fn test_plain_heading() {
        let heading = entry_heading(&entry(EntryKind::Drawing, b""), false);
        assert!(heading.starts_with("2024-06-01 08:30:00 UTC"));
        assert!(heading.contains("drawing"));
    }
}
