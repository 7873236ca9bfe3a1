//! Unit price resolution.
//!
//! Products carry up to three overlapping price sources: the `pricing` table
//! (retail and wholesale), a legacy `price`, and a `basePrice`. Which one
//! applies depends on the shopper's account type and, for retail shoppers, on
//! whether they want the balloons inflated. Every page resolves prices
//! through [`resolve_unit_price`] so the listing, the product page, the cart,
//! and the order all agree.
//!
//! A zero anywhere counts as "not listed", so a product with `"wholesale": 0`
//! falls back to its base price like one with no wholesale price at all.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::settings::ShopSettings;
use crate::{AccountType, Money};

/// Retail price: either a single number or separate inflated/uninflated prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetailPrice {
    Flat(Decimal),
    Tiered {
        #[serde(default)]
        uninflated: Option<Decimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inflated: Option<Decimal>,
    },
}

/// The `pricing` object of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retail: Option<RetailPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wholesale: Option<Decimal>,
}

/// Every price source a product (or a cart line snapshot of it) carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTable {
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Decimal>,
}

/// Retail inflation choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inflation {
    #[default]
    Uninflated,
    Inflated,
}

impl Inflation {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uninflated => "Uninflated",
            Self::Inflated => "Inflated",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninflated => "uninflated",
            Self::Inflated => "inflated",
        }
    }

    /// Parse a form value. Anything other than `inflated` is uninflated.
    #[must_use]
    pub fn from_form(value: Option<&str>) -> Self {
        match value {
            Some("inflated") => Self::Inflated,
            _ => Self::Uninflated,
        }
    }
}

fn listed(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| !v.is_zero())
}

impl PriceTable {
    fn price_or_base(&self) -> Option<Decimal> {
        listed(self.price).or_else(|| listed(self.base_price))
    }

    /// The flat retail price, or the uninflated tier.
    fn retail_listed(&self) -> Option<Decimal> {
        match &self.pricing.retail {
            Some(RetailPrice::Flat(price)) => listed(Some(*price)),
            Some(RetailPrice::Tiered { uninflated, .. }) => listed(*uninflated),
            None => None,
        }
    }

    /// The tiered retail prices, if this product offers an inflation choice.
    #[must_use]
    pub fn tiered(&self) -> Option<(Decimal, Option<Decimal>)> {
        match &self.pricing.retail {
            Some(RetailPrice::Tiered {
                uninflated,
                inflated,
            }) => Some((uninflated.unwrap_or_default(), listed(*inflated))),
            _ => None,
        }
    }

    /// Both retail prices for the inflation selector: `(uninflated, inflated)`.
    #[must_use]
    pub fn inflation_prices(&self, settings: &ShopSettings) -> Option<(Money, Money)> {
        self.tiered().map(|(uninflated, inflated)| {
            (
                Money::new(uninflated),
                Money::new(inflated.unwrap_or(uninflated + settings.inflation_fee())),
            )
        })
    }
}

/// Resolve the unit price a shopper pays.
///
/// - Wholesale: the wholesale price, then the retail price (uninflated for
///   tiered pricing), then the legacy price, then the base price.
/// - Retail and admin with tiered retail pricing: the inflated price (or the
///   uninflated price plus the shop's inflation fee) when inflated, otherwise
///   the uninflated price.
/// - Retail and admin with a flat retail price: that price.
/// - Otherwise the legacy price, then the base price.
///
/// Missing prices resolve to zero rather than failing; the catalog validator
/// reports such products.
#[must_use]
pub fn resolve_unit_price(
    table: &PriceTable,
    account: AccountType,
    inflation: Inflation,
    settings: &ShopSettings,
) -> Money {
    let amount = if account.is_wholesale() {
        listed(table.pricing.wholesale)
            .or_else(|| table.retail_listed())
            .or_else(|| table.price_or_base())
    } else {
        match &table.pricing.retail {
            Some(RetailPrice::Tiered { .. }) => table.tiered().map(|(uninflated, inflated)| {
                match inflation {
                    Inflation::Inflated => {
                        inflated.unwrap_or(uninflated + settings.inflation_fee())
                    }
                    Inflation::Uninflated => uninflated,
                }
            }),
            Some(RetailPrice::Flat(price)) => listed(Some(*price)).or_else(|| table.price_or_base()),
            None => table.price_or_base(),
        }
    };

    Money::new(amount.unwrap_or_default())
}

/// Whether the product page offers an inflated/uninflated choice.
///
/// Wholesale buyers always receive uninflated stock.
#[must_use]
pub fn has_inflation_choice(table: &PriceTable, account: AccountType) -> bool {
    !account.is_wholesale() && table.tiered().is_some()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn table(json: &str) -> PriceTable {
        serde_json::from_str(json).unwrap()
    }

    fn price(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    #[test]
    fn test_wholesale_uses_wholesale_price() {
        let t = table(r#"{"pricing": {"retail": 4.5, "wholesale": 2.25}}"#);
        let resolved = resolve_unit_price(
            &t,
            AccountType::Wholesale,
            Inflation::Uninflated,
            &ShopSettings::default(),
        );
        assert_eq!(resolved, price(225));
    }

    #[test]
    fn test_wholesale_without_wholesale_price_pays_retail() {
        let settings = ShopSettings::default();
        let t = table(r#"{"pricing": {"retail": 4}, "basePrice": 3, "price": 9}"#);
        assert_eq!(
            resolve_unit_price(&t, AccountType::Wholesale, Inflation::Uninflated, &settings),
            price(400)
        );

        let t = table(r#"{"pricing": {"retail": {"uninflated": 2.5, "inflated": 6}, "wholesale": 0}}"#);
        assert_eq!(
            resolve_unit_price(&t, AccountType::Wholesale, Inflation::Inflated, &settings),
            price(250)
        );
    }

    #[test]
    fn test_legacy_price_before_base_price() {
        let settings = ShopSettings::default();
        let t = table(r#"{"pricing": {"wholesale": 0}, "basePrice": 3, "price": 9}"#);
        assert_eq!(
            resolve_unit_price(&t, AccountType::Wholesale, Inflation::Uninflated, &settings),
            price(900)
        );
        assert_eq!(
            resolve_unit_price(&t, AccountType::Retail, Inflation::Uninflated, &settings),
            price(900)
        );

        let t = table(r#"{"basePrice": 3}"#);
        assert_eq!(
            resolve_unit_price(&t, AccountType::Wholesale, Inflation::Uninflated, &settings),
            price(300)
        );

        let t = table("{}");
        assert_eq!(
            resolve_unit_price(&t, AccountType::Wholesale, Inflation::Uninflated, &settings),
            Money::ZERO
        );
    }

    #[test]
    fn test_retail_tiered_inflation() {
        let settings = ShopSettings::default();
        let t = table(r#"{"pricing": {"retail": {"uninflated": 2, "inflated": 6.5}}}"#);
        assert_eq!(
            resolve_unit_price(&t, AccountType::Retail, Inflation::Uninflated, &settings),
            price(200)
        );
        assert_eq!(
            resolve_unit_price(&t, AccountType::Retail, Inflation::Inflated, &settings),
            price(650)
        );
    }

    #[test]
    fn test_retail_inflated_without_listed_price_adds_fee() {
        let t = table(r#"{"pricing": {"retail": {"uninflated": 2}}}"#);
        assert_eq!(
            resolve_unit_price(
                &t,
                AccountType::Retail,
                Inflation::Inflated,
                &ShopSettings::default()
            ),
            price(700)
        );

        let settings: ShopSettings = serde_json::from_str(r#"{"inflationFee": 1.5}"#).unwrap();
        assert_eq!(
            resolve_unit_price(&t, AccountType::Retail, Inflation::Inflated, &settings),
            price(350)
        );
    }

    #[test]
    fn test_admin_prices_like_retail() {
        let t = table(r#"{"pricing": {"retail": {"uninflated": 2, "inflated": 4}, "wholesale": 1}}"#);
        assert_eq!(
            resolve_unit_price(
                &t,
                AccountType::Admin,
                Inflation::Inflated,
                &ShopSettings::default()
            ),
            price(400)
        );
    }

    #[test]
    fn test_retail_flat_and_legacy_prices() {
        let settings = ShopSettings::default();
        let t = table(r#"{"pricing": {"retail": 3.75}}"#);
        assert_eq!(
            resolve_unit_price(&t, AccountType::Retail, Inflation::Inflated, &settings),
            price(375)
        );

        let t = table(r#"{"price": 8}"#);
        assert_eq!(
            resolve_unit_price(&t, AccountType::Retail, Inflation::Uninflated, &settings),
            price(800)
        );
    }

    #[test]
    fn test_inflation_choice_only_for_tiered_retail() {
        let tiered = table(r#"{"pricing": {"retail": {"uninflated": 2}}}"#);
        let flat = table(r#"{"pricing": {"retail": 2}}"#);
        assert!(has_inflation_choice(&tiered, AccountType::Retail));
        assert!(has_inflation_choice(&tiered, AccountType::Admin));
        assert!(!has_inflation_choice(&tiered, AccountType::Wholesale));
        assert!(!has_inflation_choice(&flat, AccountType::Retail));
    }

    #[test]
    fn test_inflation_prices_for_selector() {
        let t = table(r#"{"pricing": {"retail": {"uninflated": 2}}}"#);
        let (uninflated, inflated) = t.inflation_prices(&ShopSettings::default()).unwrap();
        assert_eq!(uninflated, price(200));
        assert_eq!(inflated, price(700));
    }

    #[test]
    fn test_inflation_from_form() {
        assert_eq!(Inflation::from_form(Some("inflated")), Inflation::Inflated);
        assert_eq!(Inflation::from_form(Some("nope")), Inflation::Uninflated);
        assert_eq!(Inflation::from_form(None), Inflation::Uninflated);
    }
}
