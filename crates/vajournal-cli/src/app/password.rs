//! Password input and login with retry logic.

use dialoguer::Password;
use secrecy::SecretString;
use vajournal_core::{EnvelopeStore, JournalClient, JournalError};

use crate::constants::{MAX_PASSWORD_ATTEMPTS, PASSWORD_ENV};
use crate::errors::CliError;

const FORGOTTEN_HINT: &str = "Hint: There is no password recovery. Entries written under a lost password cannot be decrypted.";

/// Password from `VAJOURNAL_PASSWORD`, if set and non-blank.
fn env_password() -> Option<SecretString> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

fn prompt_password(interactive: bool) -> anyhow::Result<SecretString> {
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No password provided and no TTY available. Set {}.",
            PASSWORD_ENV
        ))
        .into());
    }
    Password::new()
        .with_prompt("Password")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Password for a new account, confirmed when prompted.
pub fn read_new_password(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(password) = env_password() {
        return Ok(password);
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No password provided and no TTY available. Set {}.",
            PASSWORD_ENV
        ))
        .into());
    }
    Password::new()
        .with_prompt("Choose a password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Log `username` in, prompting up to three times on a terminal.
///
/// A password from the environment gets exactly one attempt.
pub fn login_with_retry<S: EnvelopeStore>(
    client: &mut JournalClient<S>,
    username: &str,
    interactive: bool,
) -> anyhow::Result<()> {
    if let Some(password) = env_password() {
        return client
            .login(username, password)
            .map_err(|err| login_error(err, false));
    }

    let max_attempts = if interactive { MAX_PASSWORD_ATTEMPTS } else { 1 };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let password = prompt_password(interactive)?;
        match client.login(username, password) {
            Ok(()) => return Ok(()),
            Err(JournalError::InvalidCredentials) => {
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    return Err(login_error(JournalError::InvalidCredentials, attempts > 1));
                }
                eprintln!(
                    "Incorrect username or password. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn login_error(err: JournalError, exhausted: bool) -> anyhow::Error {
    match err {
        JournalError::InvalidCredentials if exhausted => {
            CliError::auth_failed_with_hint("Too many failed login attempts.", FORGOTTEN_HINT).into()
        }
        JournalError::InvalidCredentials => {
            CliError::auth_failed_with_hint("Incorrect username or password.", FORGOTTEN_HINT)
                .into()
        }
        other => other.into(),
    }
}
