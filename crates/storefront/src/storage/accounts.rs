//! Account lookups over predefined and self-registered accounts.

use super::{LocalStore, StorageError, keys};
use crate::models::Account;

/// Repository for shop accounts.
///
/// Predefined accounts are read-only; registered accounts live in the store
/// under `createdAccounts`. Usernames are unique across both.
pub struct AccountRepository<'a> {
    store: &'a LocalStore,
    predefined: &'a [Account],
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(store: &'a LocalStore, predefined: &'a [Account]) -> Self {
        Self { store, predefined }
    }

    /// Find an account by exact username. Predefined accounts win.
    pub async fn find(&self, username: &str) -> Option<Account> {
        if let Some(account) = self.predefined.iter().find(|a| a.username == username) {
            return Some(account.clone());
        }
        self.find_created(username).await
    }

    /// Find a registered account by exact username.
    pub async fn find_created(&self, username: &str) -> Option<Account> {
        self.store
            .read_list::<Account>(keys::CREATED_ACCOUNTS)
            .await
            .into_iter()
            .find(|a| a.username == username)
    }

    /// Whether any account uses this username.
    pub async fn exists(&self, username: &str) -> bool {
        self.find(username).await.is_some()
    }

    /// All registered accounts.
    pub async fn list_created(&self) -> Vec<Account> {
        self.store.read_list(keys::CREATED_ACCOUNTS).await
    }

    /// Store a newly registered account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    pub async fn create(&self, account: Account) -> Result<Account, StorageError> {
        if self.predefined.iter().any(|a| a.username == account.username) {
            return Err(StorageError::Conflict(account.username));
        }

        self.store
            .update_list(keys::CREATED_ACCOUNTS, |accounts: &mut Vec<Account>| {
                if accounts.iter().any(|a| a.username == account.username) {
                    return Err(StorageError::Conflict(account.username.clone()));
                }
                accounts.push(account.clone());
                Ok(account)
            })
            .await
    }

    /// Replace the password hash of a registered account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no registered account has this username.
    pub async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), StorageError> {
        self.store
            .update_list(keys::CREATED_ACCOUNTS, |accounts: &mut Vec<Account>| {
                let account = accounts
                    .iter_mut()
                    .find(|a| a.username == username)
                    .ok_or_else(|| StorageError::NotFound(username.to_string()))?;
                account.password_hash = password_hash.to_string();
                Ok(())
            })
            .await
    }
}
