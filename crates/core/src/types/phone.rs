//! Phone number type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Optional leading `+`, then up to 16 digits not starting with zero.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // Static pattern, covered by tests
    Regex::new(r"^\+?[1-9]\d{0,15}$").unwrap()
});

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number cannot be empty")]
    Empty,
    #[error("invalid phone number")]
    Invalid,
}

/// A phone number as entered by the customer.
///
/// Spaces, dashes, and parentheses are accepted as separators; validation
/// runs on the remaining characters. The original input is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a phone number.
    ///
    /// # Errors
    ///
    /// Returns `PhoneError::Empty` for blank input and `PhoneError::Invalid`
    /// when the digits don't form a valid number.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let compact: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();

        if !PHONE_PATTERN.is_match(&compact) {
            return Err(PhoneError::Invalid);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns true if the input would parse.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_formats() {
        assert!(Phone::is_valid("1234567890"));
        assert!(Phone::is_valid("(555) 123-4567"));
        assert!(Phone::is_valid("+44 20 7946 0958"));
        assert!(Phone::is_valid("5"));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
        assert_eq!(Phone::parse("0123456"), Err(PhoneError::Invalid));
        assert_eq!(Phone::parse("555.123.4567"), Err(PhoneError::Invalid));
        assert_eq!(Phone::parse("call me"), Err(PhoneError::Invalid));
        assert_eq!(
            Phone::parse("12345678901234567"),
            Err(PhoneError::Invalid)
        );
    }

    #[test]
    fn test_keeps_original_formatting() {
        let phone = Phone::parse(" (555) 123-4567 ").unwrap();
        assert_eq!(phone.as_str(), "(555) 123-4567");
    }
}
