//! Money amounts for a single-currency (NPR) storefront.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in Nepalese rupees.
///
/// Every amount the storefront shows is server-computed: carts and orders
/// arrive already priced, and this type only carries and renders them.
/// There is deliberately no arithmetic on `Money` - subtotals, discounts
/// and delivery charges are backend-owned figures.
///
/// The wire representation is a bare JSON number (`1500`, `950.5`), which
/// the transparent serde impl accepts directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// ISO 4217 code for Nepalese rupees.
    pub const CURRENCY: &'static str = "NPR";

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The zero amount.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Render as `NPR 1,234.56`: thousands grouped, all-zero fractions
    /// dropped (`NPR 1,500`, not `NPR 1,500.00`).
    #[must_use]
    pub fn format(&self) -> String {
        let text = self.0.normalize().to_string();
        let (raw_int, fraction) = match text.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (text.as_str(), None),
        };
        let (sign, digits) = raw_int
            .strip_prefix('-')
            .map_or(("", raw_int), |rest| ("-", rest));

        let count = digits.chars().count();
        let mut grouped = String::with_capacity(count + count / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (count - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        match fraction {
            Some(frac) => format!("{} {sign}{grouped}.{frac}", Self::CURRENCY),
            None => format!("{} {sign}{grouped}", Self::CURRENCY),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn money(s: &str) -> Money {
        Money::new(s.parse::<Decimal>().unwrap())
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(money("999").format(), "NPR 999");
        assert_eq!(money("1234").format(), "NPR 1,234");
        assert_eq!(money("1234567").format(), "NPR 1,234,567");
    }

    #[test]
    fn test_format_drops_all_zero_fraction() {
        assert_eq!(money("1500.00").format(), "NPR 1,500");
        assert_eq!(money("950.50").format(), "NPR 950.5");
        assert_eq!(money("950.55").format(), "NPR 950.55");
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(Money::zero().format(), "NPR 0");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(money("-1234.5").format(), "NPR -1,234.5");
    }

    #[test]
    fn test_deserializes_from_bare_numbers() {
        let from_int: Money = serde_json::from_str("1500").unwrap();
        assert_eq!(from_int, money("1500"));

        let from_float: Money = serde_json::from_str("950.5").unwrap();
        assert_eq!(from_float, money("950.5"));
    }

    #[test]
    fn test_value_equality_ignores_scale() {
        assert_eq!(money("1500"), money("1500.00"));
    }
}
