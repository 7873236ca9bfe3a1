//! Session-related types.
//!
//! Everything a visitor carries between requests lives in their session:
//! who they are logged in as, their cart, the checkout prefill, the product
//! to highlight on the home page, and a one-shot notice.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use balloon_fiesta_core::{AccountType, Email, Phone};

use super::Account;

/// Session-stored identity of the logged-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shopper {
    pub username: String,
    pub account_type: AccountType,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<Phone>,
    pub login_time: NaiveDateTime,
}

impl Shopper {
    #[must_use]
    pub fn from_account(account: &Account, login_time: NaiveDateTime) -> Self {
        Self {
            username: account.username.clone(),
            account_type: account.account_type,
            email: account.email.clone(),
            phone: account.phone.clone(),
            login_time,
        }
    }
}

/// Severity of a flashed notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NoticeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Logged-in shopper.
    pub const SHOPPER: &str = "shopper";

    /// Cart lines.
    pub const CART: &str = "cart";

    /// Contact details carried from the cart to checkout.
    pub const CHECKOUT_PREFILL: &str = "checkout_prefill";

    /// Product to highlight on the home page.
    pub const HIGHLIGHT_PRODUCT: &str = "highlight_product";

    /// One-shot notice.
    pub const NOTICE: &str = "notice";
}
