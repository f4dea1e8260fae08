//! Password validation.
//!
//! Callers reject unusable passwords here before they reach the KDF.

use crate::error::{JournalError, Result};

/// Default minimum length for newly registered passwords.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a password supplied at login.
///
/// Only empty or whitespace-only input is rejected; existing accounts may
/// predate the length policy.
pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(JournalError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate a password being registered.
///
/// # Examples
///
/// ```
/// use vajournal_core::crypto::validate_new_password;
///
/// assert!(validate_new_password("correct-horse", 8).is_ok());
/// assert!(validate_new_password("short", 8).is_err());
/// ```
pub fn validate_new_password(password: &str, min_length: usize) -> Result<()> {
    validate_password(password)?;

    let length = password.chars().count();
    if length < min_length {
        return Err(JournalError::InvalidInput(format!(
            "Password must be at least {} characters (got {})",
            min_length, length
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("x").is_ok());
        assert!(validate_new_password("correct-horse", 8).is_ok());
        assert!(validate_new_password("longer password with spaces!", 8).is_ok());
    }

    #[test]
    fn test_password_empty() {
        assert!(validate_password("").is_err());
        assert!(validate_password("   ").is_err());
        assert!(validate_new_password("\n\t", 0).is_err());
    }

    #[test]
    fn test_new_password_too_short() {
        let result = validate_new_password("short", 8);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("at least 8 characters"));
    }

    #[test]
    fn test_length_counts_characters() {
        // Four characters, twelve bytes.
        assert!(validate_new_password("ключ", 5).is_err());
        assert!(validate_new_password("ключ", 4).is_ok());
    }
}
