//! Payment methods accepted at checkout.

use serde::{Deserialize, Serialize};

/// The closed set of payment methods the storefront offers.
///
/// Wire identifiers use `SCREAMING_SNAKE_CASE` to match the commerce API
/// (`"CASH_ON_DELIVERY"`, `"IME_PAY"`, ...). The set is fixed: adding a
/// gateway is a coordinated backend + storefront change, not configuration,
/// so unknown identifiers are rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Pay the courier on delivery. The checkout default.
    #[default]
    CashOnDelivery,
    Esewa,
    Khalti,
    ImePay,
    BankTransfer,
}

impl PaymentMethod {
    /// Every method, in the order checkout presents them.
    pub const ALL: [Self; 5] = [
        Self::CashOnDelivery,
        Self::Esewa,
        Self::Khalti,
        Self::ImePay,
        Self::BankTransfer,
    ];

    /// The wire identifier sent to the commerce API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "CASH_ON_DELIVERY",
            Self::Esewa => "ESEWA",
            Self::Khalti => "KHALTI",
            Self::ImePay => "IME_PAY",
            Self::BankTransfer => "BANK_TRANSFER",
        }
    }

    /// Human-readable name shown on the checkout page.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Esewa => "eSewa",
            Self::Khalti => "Khalti",
            Self::ImePay => "IME Pay",
            Self::BankTransfer => "Bank Transfer",
        }
    }

    /// One-line description shown under the label.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Pay when your order arrives",
            Self::Esewa => "Pay with your eSewa wallet",
            Self::Khalti => "Pay with your Khalti wallet",
            Self::ImePay => "Pay with IME Pay",
            Self::BankTransfer => "Direct bank transfer",
        }
    }

    /// Parse a wire identifier; `None` for identifiers outside the set.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.as_str() == value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cash_on_delivery() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::CashOnDelivery);
    }

    #[test]
    fn test_wire_identifiers_round_trip() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));

            let parsed: PaymentMethod = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        assert!(serde_json::from_str::<PaymentMethod>("\"PAYPAL\"").is_err());
    }

    #[test]
    fn test_parse_matches_wire_identifiers() {
        assert_eq!(
            PaymentMethod::parse("IME_PAY"),
            Some(PaymentMethod::ImePay)
        );
        assert_eq!(PaymentMethod::parse("PAYPAL"), None);
        assert_eq!(PaymentMethod::parse("esewa"), None);
    }

    #[test]
    fn test_all_lists_every_method_once() {
        let mut seen = std::collections::HashSet::new();
        for method in PaymentMethod::ALL {
            assert!(seen.insert(method.as_str()));
        }
        assert_eq!(seen.len(), 5);
    }
}
