//! Authentication service.
//!
//! Username and password authentication over the predefined accounts and the
//! accounts shoppers register themselves.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::NaiveDateTime;
use secrecy::{ExposeSecret, SecretString};

use balloon_fiesta_core::password::{MIN_CHANGE_LENGTH, password_strength};
use balloon_fiesta_core::{AccountType, Email, Phone};

use crate::models::Account;
use crate::storage::{AccountRepository, LocalStore, StorageError};

/// Minimum username length.
const MIN_USERNAME_LENGTH: usize = 3;

/// A registration request.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub email: String,
    pub phone: String,
}

/// A password change request.
#[derive(Debug)]
pub struct PasswordChange {
    pub current: SecretString,
    pub new: SecretString,
    pub confirm: SecretString,
}

/// Authentication service.
///
/// Handles login, registration, and password changes.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a LocalStore, predefined: &'a [Account]) -> Self {
        Self {
            accounts: AccountRepository::new(store, predefined),
        }
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyFields` if either field is empty.
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Account, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::EmptyFields);
        }

        let account = self
            .accounts
            .find(username)
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password.expose_secret(), &account.password_hash)?;

        Ok(account)
    }

    /// Register a new retail account.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, in the order: required fields,
    /// username length, password confirmation, password strength, email,
    /// phone (when given), username availability.
    pub async fn register(&self, registration: Registration, now: NaiveDateTime) -> Result<Account, AuthError> {
        let username = registration.username.trim();
        let password = registration.password.expose_secret();
        let email = registration.email.trim();
        let phone = registration.phone.trim();

        if username.is_empty()
            || password.is_empty()
            || registration.confirm_password.expose_secret().is_empty()
            || email.is_empty()
        {
            return Err(AuthError::MissingFields);
        }

        if username.chars().count() < MIN_USERNAME_LENGTH {
            return Err(AuthError::UsernameTooShort);
        }

        if password != registration.confirm_password.expose_secret() {
            return Err(AuthError::PasswordMismatch);
        }

        if !password_strength(password).is_acceptable() {
            return Err(AuthError::WeakPassword);
        }

        let email = Email::parse(email)?;
        let phone = if phone.is_empty() {
            None
        } else {
            Some(Phone::parse(phone)?)
        };

        if self.accounts.exists(username).await {
            return Err(AuthError::UserAlreadyExists);
        }

        let account = Account {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            account_type: AccountType::Retail,
            email,
            phone,
            created_at: Some(now),
        };

        let account = self.accounts.create(account).await.map_err(|e| match e {
            StorageError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Storage(other),
        })?;

        Ok(account)
    }

    /// Change the password of a registered account.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, in the order: all fields filled,
    /// confirmation matches, new password long enough, new password differs,
    /// account was registered, current password verifies.
    pub async fn change_password(&self, username: &str, change: &PasswordChange) -> Result<(), AuthError> {
        let current = change.current.expose_secret();
        let new = change.new.expose_secret();

        if current.is_empty() || new.is_empty() || change.confirm.expose_secret().is_empty() {
            return Err(AuthError::EmptyFields);
        }

        if new != change.confirm.expose_secret() {
            return Err(AuthError::NewPasswordMismatch);
        }

        if new.chars().count() < MIN_CHANGE_LENGTH {
            return Err(AuthError::PasswordTooShort);
        }

        if new == current {
            return Err(AuthError::PasswordUnchanged);
        }

        let account = self
            .accounts
            .find_created(username)
            .await
            .ok_or(AuthError::NotChangeable)?;

        verify_password(current, &account.password_hash).map_err(|_| AuthError::IncorrectPassword)?;

        let password_hash = hash_password(new)?;
        self.accounts
            .update_password(username, &password_hash)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => AuthError::NotChangeable,
                other => AuthError::Storage(other),
            })?;

        Ok(())
    }

    /// Whether any account uses this username.
    pub async fn username_exists(&self, username: &str) -> bool {
        self.accounts.exists(username.trim()).await
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password doesn't match or
/// the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
