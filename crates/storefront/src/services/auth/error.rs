//! Authentication error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
///
/// The message of every variant except the last two is shown to the shopper
/// as is.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A login or password change form had an empty field.
    #[error("Please fill in all fields")]
    EmptyFields,

    /// Registration form had an empty required field.
    #[error("Please fill in all required fields")]
    MissingFields,

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username must be at least 3 characters long")]
    UsernameTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Registration password scored below the required strength.
    #[error("Password is too weak. Please choose a stronger password.")]
    WeakPassword,

    #[error("Please enter a valid email address")]
    InvalidEmail(#[from] balloon_fiesta_core::EmailError),

    #[error("Please enter a valid phone number")]
    InvalidPhone(#[from] balloon_fiesta_core::PhoneError),

    /// Username is used by a predefined or registered account.
    #[error("Username already exists")]
    UserAlreadyExists,

    #[error("New passwords do not match")]
    NewPasswordMismatch,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("New password must be different from current password")]
    PasswordUnchanged,

    /// Predefined accounts can't change their password.
    #[error("You can only change password for accounts created through registration")]
    NotChangeable,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// Store error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the error comes from the server rather than the shopper's input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::PasswordHash)
    }
}
