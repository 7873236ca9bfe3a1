//! Checkout form validation.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hours::{self, PickupError};
use crate::{AccountType, Email, Phone};

/// A form field that failed validation, with the message shown under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Checkout failures that aren't tied to one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Please fill out all required fields correctly")]
    Invalid(Vec<FieldError>),

    #[error("Your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Pickup(#[from] PickupError),
}

/// Raw checkout form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub pickup_date: Option<String>,
    #[serde(default)]
    pub pickup_time: Option<String>,
}

/// A scheduled in-store pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pickup {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// A checkout form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub name: String,
    pub email: Email,
    pub address: String,
    pub phone: Phone,
    /// Present for shoppers who collect in store.
    pub pickup: Option<Pickup>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl CheckoutForm {
    /// Validate the form for an account at a moment in shop-local time.
    ///
    /// Shoppers who collect in store (everyone but wholesale) must choose a
    /// pickup date and time that the store schedule accepts.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Invalid` with one entry per failing field, or
    /// `CheckoutError::Pickup` when the fields are fine but the schedule
    /// refuses the pickup.
    pub fn validate(&self, account: AccountType, now: NaiveDateTime) -> Result<ValidCheckout, CheckoutError> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("address", &self.address),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, format!("Please enter your {field}")));
            }
        }

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(_) if self.email.trim().is_empty() => None,
            Err(_) => {
                errors.push(FieldError::new("email", "Please enter a valid email address"));
                None
            }
        };

        let phone = match Phone::parse(&self.phone) {
            Ok(phone) => Some(phone),
            Err(_) if self.phone.trim().is_empty() => None,
            Err(_) => {
                errors.push(FieldError::new("phone", "Please enter a valid phone number"));
                None
            }
        };

        let pickup = if account.is_wholesale() {
            None
        } else {
            self.pickup_fields(now, &mut errors)
        };

        match (email, phone) {
            (Some(email), Some(phone)) if errors.is_empty() => {
                if let Some(pickup) = pickup {
                    hours::validate_pickup(pickup.date, pickup.time, now)?;
                }
                Ok(ValidCheckout {
                    name: self.name.trim().to_string(),
                    email,
                    address: self.address.trim().to_string(),
                    phone,
                    pickup,
                })
            }
            _ => Err(CheckoutError::Invalid(errors)),
        }
    }

    fn pickup_fields(&self, now: NaiveDateTime, errors: &mut Vec<FieldError>) -> Option<Pickup> {
        let date = match non_empty(self.pickup_date.as_deref()) {
            None => {
                errors.push(FieldError::new("pickup_date", "Please select a pickup date"));
                None
            }
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) if date < now.date() => {
                    errors.push(FieldError::new("pickup_date", "Pickup date cannot be in the past"));
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError::new("pickup_date", "Please select a pickup date"));
                    None
                }
            },
        };

        let time = match non_empty(self.pickup_time.as_deref()).map(parse_clock) {
            Some(Some(time)) => Some(time),
            _ => {
                errors.push(FieldError::new("pickup_time", "Please select a pickup time"));
                None
            }
        };

        Some(Pickup { date: date?, time: time? })
    }
}

/// Parse an `HH:MM` or `HH:MM:SS` form value.
#[must_use]
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Contact details carried from the cart page into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPrefill {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub account_type: AccountType,
}

impl CheckoutPrefill {
    /// An empty form seeded with the prefill.
    #[must_use]
    pub fn to_form(&self) -> CheckoutForm {
        CheckoutForm {
            name: self.username.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            ..CheckoutForm::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Monday morning.
    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-01-05 09:00", "%Y-%m-%d %H:%M").unwrap()
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: " Ada ".to_string(),
            email: "ada@example.com".to_string(),
            address: "1 Main St".to_string(),
            phone: "(555) 123-4567".to_string(),
            pickup_date: Some("2026-01-05".to_string()),
            pickup_time: Some("12:00".to_string()),
        }
    }

    fn field_errors(result: Result<ValidCheckout, CheckoutError>) -> Vec<(&'static str, String)> {
        match result {
            Err(CheckoutError::Invalid(errors)) => errors.into_iter().map(|e| (e.field, e.message)).collect(),
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_retail_checkout() {
        let valid = form().validate(AccountType::Retail, now()).unwrap();
        assert_eq!(valid.name, "Ada");
        assert_eq!(valid.email.as_str(), "ada@example.com");
        let pickup = valid.pickup.unwrap();
        assert_eq!(pickup.time, parse_clock("12:00").unwrap());
    }

    #[test]
    fn test_wholesale_ignores_pickup() {
        let form = CheckoutForm {
            pickup_date: None,
            pickup_time: None,
            ..form()
        };
        let valid = form.validate(AccountType::Wholesale, now()).unwrap();
        assert!(valid.pickup.is_none());
    }

    #[test]
    fn test_required_and_format_errors() {
        let form = CheckoutForm {
            name: String::new(),
            email: "not-an-email".to_string(),
            phone: "abc".to_string(),
            ..form()
        };
        let errors = field_errors(form.validate(AccountType::Wholesale, now()));
        assert_eq!(
            errors,
            [
                ("name", "Please enter your name".to_string()),
                ("email", "Please enter a valid email address".to_string()),
                ("phone", "Please enter a valid phone number".to_string()),
            ]
        );
    }

    #[test]
    fn test_pickup_fields_required_unless_wholesale() {
        for account in [AccountType::Retail, AccountType::Admin] {
            let form = CheckoutForm {
                pickup_date: None,
                pickup_time: Some(String::new()),
                ..form()
            };
            let errors = field_errors(form.validate(account, now()));
            assert_eq!(
                errors,
                [
                    ("pickup_date", "Please select a pickup date".to_string()),
                    ("pickup_time", "Please select a pickup time".to_string()),
                ],
                "{account:?}"
            );
        }
    }

    #[test]
    fn test_pickup_date_in_past() {
        let form = CheckoutForm {
            pickup_date: Some("2026-01-04".to_string()),
            ..form()
        };
        let errors = field_errors(form.validate(AccountType::Retail, now()));
        assert_eq!(errors, [("pickup_date", "Pickup date cannot be in the past".to_string())]);
    }

    #[test]
    fn test_pickup_schedule_is_enforced() {
        let form = CheckoutForm {
            pickup_time: Some("19:45".to_string()),
            ..form()
        };
        let err = form.validate(AccountType::Retail, now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Pickup must be at least 30 minutes before closing (8:00 PM)"
        );
    }

    #[test]
    fn test_prefill_seeds_form() {
        let prefill = CheckoutPrefill {
            username: "customer".to_string(),
            email: "customer@example.com".to_string(),
            phone: "1234567890".to_string(),
            account_type: AccountType::Retail,
        };
        let form = prefill.to_form();
        assert_eq!(form.name, "customer");
        assert_eq!(form.phone, "1234567890");
        assert!(form.pickup_date.is_none());
    }
}
