//! Customer account tiers.

use serde::{Deserialize, Serialize};

/// The tier an account belongs to.
///
/// Visitors who are not logged in are treated as `Retail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Walk-in customers. Pick up in store, may choose inflated balloons.
    #[default]
    Retail,
    /// Business customers. Wholesale prices, minimum quantities, shipping.
    Wholesale,
    /// Shop staff. Retail pricing plus the order review page.
    Admin,
}

impl AccountType {
    #[must_use]
    pub const fn is_wholesale(self) -> bool {
        matches!(self, Self::Wholesale)
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Badge text shown next to the username.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Retail => "Retail",
            Self::Wholesale => "Wholesale",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retail => write!(f, "retail"),
            Self::Wholesale => write!(f, "wholesale"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retail" => Ok(Self::Retail),
            "wholesale" => Ok(Self::Wholesale),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid account type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_strings() {
        for account in [
            AccountType::Retail,
            AccountType::Wholesale,
            AccountType::Admin,
        ] {
            assert_eq!(account.to_string().parse::<AccountType>().unwrap(), account);
        }
        assert!("vip".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&AccountType::Wholesale).unwrap();
        assert_eq!(json, "\"wholesale\"");
        assert_eq!(AccountType::default(), AccountType::Retail);
    }
}
