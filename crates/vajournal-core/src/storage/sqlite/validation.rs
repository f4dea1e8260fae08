//! Username, journal name and payload validation.

use crate::error::{JournalError, Result};

/// Maximum characters in a username or journal name.
pub const MAX_NAME_CHARS: usize = 64;

/// Maximum bytes for one entry payload (transport-encoded envelope).
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Trim and validate a username.
pub fn normalize_username(username: &str) -> Result<String> {
    normalize_name(username, "Username")
}

/// Trim and validate a journal name.
pub fn normalize_journal_name(name: &str) -> Result<String> {
    normalize_name(name, "Journal name")
}

fn normalize_name(value: &str, label: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(JournalError::InvalidInput(format!(
            "{} cannot be empty",
            label
        )));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(JournalError::InvalidInput(format!(
            "{} too long (max {} characters)",
            label, MAX_NAME_CHARS
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(JournalError::InvalidInput(format!(
            "{} contains control characters",
            label
        )));
    }
    Ok(trimmed.to_string())
}

/// Check payload size bounds without looking at its contents.
pub fn check_payload(payload: &str) -> Result<()> {
    if payload.is_empty() {
        return Err(JournalError::InvalidInput(
            "Entry payload cannot be empty".to_string(),
        ));
    }
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(JournalError::InvalidInput(format!(
            "Entry payload too large (max {} bytes)",
            MAX_PAYLOAD_BYTES
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_trimmed() {
        assert_eq!(normalize_username("  alice ").unwrap(), "alice");
        assert_eq!(normalize_journal_name("dreams\t").unwrap(), "dreams");
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(normalize_username("").is_err());
        assert!(normalize_journal_name("   ").is_err());
    }

    #[test]
    fn test_long_names_rejected() {
        let name = "n".repeat(MAX_NAME_CHARS + 1);
        let err = normalize_journal_name(&name).unwrap_err();
        assert!(err.to_string().contains("too long"));
        assert!(normalize_journal_name(&"n".repeat(MAX_NAME_CHARS)).is_ok());
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(normalize_journal_name("line\nbreak").is_err());
    }

    #[test]
    fn test_payload_bounds() {
        assert!(check_payload("").is_err());
        assert!(check_payload("{}").is_ok());
    }
}
