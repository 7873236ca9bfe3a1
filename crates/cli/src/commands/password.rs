//! Password hashing for the predefined accounts file.
//!
//! # Usage
//!
//! ```bash
//! bf-cli hash-password 'secret'
//! ```
//!
//! Paste the printed hash into the account's `password_hash` field.

use std::io::{self, BufRead, Write};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use balloon_fiesta_storefront::services::auth::{AuthError, hash_password};

/// Errors that can occur while hashing.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Nothing to hash.
    #[error("Password is empty")]
    Empty,

    /// Reading stdin or writing stdout failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Hashing failed.
    #[error("Hashing failed: {0}")]
    Hash(#[from] AuthError),
}

/// Hash a password given as an argument, or the first line of stdin.
///
/// # Errors
///
/// Returns an error if the password is empty or cannot be hashed.
pub fn hash(password: Option<String>) -> Result<(), PasswordError> {
    let password = match password {
        Some(password) => SecretString::from(password),
        None => read_stdin_line()?,
    };

    let hash = hash_secret(&password)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{hash}")?;
    Ok(())
}

fn read_stdin_line() -> Result<SecretString, PasswordError> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn hash_secret(password: &SecretString) -> Result<String, PasswordError> {
    let password = password.expose_secret();
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    tracing::debug!("Hashing password");
    Ok(hash_password(password)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use balloon_fiesta_storefront::services::auth::verify_password;

    #[test]
    fn test_hash_verifies() {
        let hash = hash_secret(&SecretString::from("Balloons!2026".to_string())).unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Balloons!2026", &hash).is_ok());
    }

    #[test]
    fn test_empty_password_rejected() {
        let result = hash_secret(&SecretString::from(String::new()));
        assert!(matches!(result, Err(PasswordError::Empty)));
    }
}
