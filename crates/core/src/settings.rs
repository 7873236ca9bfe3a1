//! Shop-wide settings carried in the catalog document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Money;

/// Flat shipping fee for wholesale orders under the free-shipping threshold.
pub const WHOLESALE_SHIPPING_FEE_CENTS: i64 = 499;

/// Surcharge for inflated balloons when a product lists no inflated price.
const DEFAULT_INFLATION_FEE: i64 = 5;

const DEFAULT_MINIMUM_ORDER: u32 = 5;
const DEFAULT_FREE_SHIPPING_THRESHOLD: i64 = 300;

/// The `settings` object of `web.json`.
///
/// Every field is optional in the document; accessors apply the shop defaults
/// so callers never see a zero fee or a zero threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflation_fee: Option<Decimal>,
    #[serde(default)]
    pub wholesale_settings: WholesaleSettings,
}

/// Wholesale rules from `settings.wholesaleSettings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WholesaleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_minimum_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_shipping_threshold: Option<Decimal>,
}

impl ShopSettings {
    /// Surcharge added to the uninflated price when no inflated price is listed.
    #[must_use]
    pub fn inflation_fee(&self) -> Decimal {
        self.inflation_fee
            .filter(|fee| !fee.is_zero())
            .unwrap_or_else(|| Decimal::from(DEFAULT_INFLATION_FEE))
    }

    /// Minimum wholesale quantity for products with no product or category rule.
    #[must_use]
    pub fn default_minimum_order(&self) -> u32 {
        self.wholesale_settings
            .default_minimum_order
            .filter(|min| *min > 0)
            .unwrap_or(DEFAULT_MINIMUM_ORDER)
    }

    /// Wholesale subtotal at which shipping becomes free.
    #[must_use]
    pub fn free_shipping_threshold(&self) -> Money {
        Money::new(
            self.wholesale_settings
                .free_shipping_threshold
                .filter(|threshold| !threshold.is_zero())
                .unwrap_or_else(|| Decimal::from(DEFAULT_FREE_SHIPPING_THRESHOLD)),
        )
    }

    /// Shipping fee charged below the free-shipping threshold.
    #[must_use]
    pub fn shipping_fee(&self) -> Money {
        Money::from_cents(WHOLESALE_SHIPPING_FEE_CENTS)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let settings = ShopSettings::default();
        assert_eq!(settings.inflation_fee(), Decimal::from(5));
        assert_eq!(settings.default_minimum_order(), 5);
        assert_eq!(settings.free_shipping_threshold(), Money::from_cents(30_000));
        assert_eq!(settings.shipping_fee().to_string(), "$4.99");
    }

    #[test]
    fn test_reads_document_values() {
        let settings: ShopSettings = serde_json::from_str(
            r#"{"inflationFee": 3, "wholesaleSettings": {"defaultMinimumOrder": 12, "freeShippingThreshold": 250}}"#,
        )
        .unwrap();
        assert_eq!(settings.inflation_fee(), Decimal::from(3));
        assert_eq!(settings.default_minimum_order(), 12);
        assert_eq!(settings.free_shipping_threshold(), Money::from_cents(25_000));
    }

    #[test]
    fn test_zero_values_fall_back() {
        let settings: ShopSettings = serde_json::from_str(
            r#"{"inflationFee": 0, "wholesaleSettings": {"defaultMinimumOrder": 0}}"#,
        )
        .unwrap();
        assert_eq!(settings.inflation_fee(), Decimal::from(5));
        assert_eq!(settings.default_minimum_order(), 5);
    }
}
