//! Shop accounts.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use balloon_fiesta_core::{AccountType, Email, Phone};

/// A shop account.
///
/// Predefined accounts come from the accounts file and have no `created_at`;
/// accounts created through registration are stored in the shop store.
/// Implements `Debug` manually to redact the password hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    #[serde(default)]
    pub account_type: AccountType,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("account_type", &self.account_type)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_hash() {
        let account = Account {
            username: "customer".to_string(),
            password_hash: "$argon2id$secret-hash".to_string(),
            account_type: AccountType::Retail,
            email: Email::parse("customer@example.com").unwrap(),
            phone: None,
            created_at: None,
        };
        let debug_output = format!("{account:?}");
        assert!(debug_output.contains("customer@example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret-hash"));
    }

    #[test]
    fn test_account_type_defaults_to_retail() {
        let account: Account = serde_json::from_str(
            r#"{"username": "u", "passwordHash": "h", "email": "u@example.com"}"#,
        )
        .unwrap();
        assert_eq!(account.account_type, AccountType::Retail);
    }
}
