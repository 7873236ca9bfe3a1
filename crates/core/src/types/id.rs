//! Newtype IDs for type-safe entity references.
//!
//! Catalog entities use numeric IDs from the `web.json` document. Records the
//! shop creates itself (orders, wholesale requests) use prefixed reference
//! strings that customers can read back over the phone.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>`, `Into<i64>` and `FromStr`
///
/// # Example
///
/// ```rust
/// # use balloon_fiesta_core::define_id;
/// define_id!(ShelfId);
///
/// let id = ShelfId::new(7);
/// assert_eq!(id.as_i64(), 7);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);

/// Macro to define a prefixed reference ID such as `ORD-1700000000000`.
///
/// The suffix is the creation instant in Unix milliseconds, so references sort
/// by creation time.
macro_rules! define_reference {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Reference prefix.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a reference for the given creation instant.
            #[must_use]
            pub fn generate(at: DateTime<Utc>) -> Self {
                Self(format!("{}-{}", Self::PREFIX, at.timestamp_millis()))
            }

            /// The reference one millisecond later. Used to resolve two
            /// references created in the same millisecond.
            #[must_use]
            pub fn successor(&self) -> Self {
                let millis = self
                    .0
                    .rsplit('-')
                    .next()
                    .and_then(|m| m.parse::<i64>().ok())
                    .unwrap_or_default();
                Self(format!("{}-{}", Self::PREFIX, millis.saturating_add(1)))
            }

            /// Wrap an existing reference string.
            #[must_use]
            pub fn from_string(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the reference as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_reference!(
    /// Customer-facing order reference (`ORD-<millis>`).
    OrderId,
    "ORD"
);

define_reference!(
    /// Wholesale account request reference (`REQ-<millis>`).
    WholesaleRequestId,
    "REQ"
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_product_id_from_str() {
        let id: ProductId = " 42 ".parse().unwrap();
        assert_eq!(id, ProductId::new(42));
        assert!("abc".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_product_id_serde_transparent() {
        let id: ProductId = serde_json::from_str("17").unwrap();
        assert_eq!(id.as_i64(), 17);
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");
    }

    #[test]
    fn test_order_id_generate() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let id = OrderId::generate(at);
        assert_eq!(id.as_str(), "ORD-1704067200000");
    }

    #[test]
    fn test_wholesale_request_id_prefix() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        let id = WholesaleRequestId::generate(at);
        assert!(id.to_string().starts_with("REQ-"));
    }
}
