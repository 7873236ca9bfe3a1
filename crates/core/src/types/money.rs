//! Money type for displaying and totalling prices.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount in the shop's single currency (USD).
///
/// The shop never converts currencies, so unlike a general-purpose price type
/// there is no currency code: only the decimal amount.
///
/// ```
/// use balloon_fiesta_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::new(Decimal::new(1299, 2));
/// assert_eq!(price.to_string(), "$12.99");
/// assert_eq!((price * 3).to_string(), "$38.97");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Amount without the currency symbol, rounded to cents (`12.50`).
    #[must_use]
    pub fn plain(&self) -> String {
        format!(
            "{:.2}",
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.plain())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Money::new(Decimal::new(5, 0)).to_string(), "$5.00");
        assert_eq!(Money::new(Decimal::new(12345, 3)).to_string(), "$12.35");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_sum_and_multiply() {
        let lines = [Money::from_cents(250) * 4, Money::from_cents(499)];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total, Money::from_cents(1499));
    }

    #[test]
    fn test_deserializes_json_numbers() {
        let money: Money = serde_json::from_str("3.5").unwrap();
        assert_eq!(money, Money::from_cents(350));
    }
}
