//! Checkout flow logic.
//!
//! The pure half of order placement: choosing the effective delivery
//! address, validating a submission before anything touches the network,
//! assembling the order draft, and turning failures into the messages the
//! checkout page shows.
//!
//! The checkout page renders the cart state into the form as a JSON
//! snapshot ([`CartSnapshot`]) and the submission posts it back, so the
//! draft is assembled from exactly what the customer saw - not from a
//! re-fetch that might have drifted.

use serde::{Deserialize, Serialize};

use pasal_core::{AddressId, Money, PaymentMethod, ProductId};

use crate::commerce::CommerceError;
use crate::commerce::types::{Address, Cart, OrderDraft, OrderDraftItem};

/// Shown when submission is attempted with no delivery address available.
pub const NO_ADDRESS_MESSAGE: &str = "Please select a delivery address";

/// Shown when submission is attempted with an empty cart.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty";

/// Fallback when order placement fails without a usable server message.
pub const ORDER_FAILED_MESSAGE: &str = "Failed to place order";

/// Stands in for the missing-fields list when the backend sends none.
const VERIFICATION_FALLBACK: &str = "email/phone verification";

/// The cart state rendered into the checkout form and posted back on
/// submit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartLineSnapshot>,
    pub total: Money,
}

/// One cart line as the checkout page displayed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

impl CartSnapshot {
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            items: cart
                .items
                .iter()
                .map(|item| CartLineSnapshot {
                    product_id: item.product.id.clone(),
                    name: item.product.name.clone(),
                    price: item.product.price,
                    quantity: item.quantity,
                })
                .collect(),
            total: cart.total,
        }
    }

    /// The snapshot lines as order-draft inputs.
    #[must_use]
    pub fn draft_items(&self) -> Vec<OrderDraftItem> {
        self.items
            .iter()
            .map(|line| OrderDraftItem {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The address an order ships to: the explicit selection when present,
/// else the default-flagged address, else the first saved one.
#[must_use]
pub fn effective_address_id(
    addresses: &[Address],
    selected: Option<&AddressId>,
) -> Option<AddressId> {
    if let Some(selected) = selected {
        return Some(selected.clone());
    }
    addresses
        .iter()
        .find(|address| address.is_default)
        .or_else(|| addresses.first())
        .map(|address| address.id.clone())
}

/// Validate a submission and assemble the order draft.
///
/// Both checks run before any backend call: a missing address is reported
/// first, then an empty cart. The returned message renders directly on the
/// checkout page.
///
/// # Errors
///
/// Returns the user-facing message when a precondition fails.
pub fn build_order_draft(
    address_id: Option<AddressId>,
    items: Vec<OrderDraftItem>,
    payment_method: PaymentMethod,
    note: Option<&str>,
) -> Result<OrderDraft, &'static str> {
    let Some(address_id) = address_id else {
        return Err(NO_ADDRESS_MESSAGE);
    };
    if items.is_empty() {
        return Err(EMPTY_CART_MESSAGE);
    }

    Ok(OrderDraft {
        address_id,
        items,
        payment_method,
        note: normalize_note(note),
    })
}

/// Trim the note; whitespace-only notes are dropped entirely so the order
/// payload omits the field.
fn normalize_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
}

/// The remediation message for a verification-gated submission.
///
/// The backend names the unverified fields (`["email", "phone"]` becomes
/// "Verify email & phone to place orders."); an empty list falls back to a
/// generic phrase.
#[must_use]
pub fn verification_message(missing: &[String]) -> String {
    let what = if missing.is_empty() {
        VERIFICATION_FALLBACK.to_string()
    } else {
        missing.join(" & ")
    };
    format!("Verify {what} to place orders.")
}

/// The user-facing message for a failed order submission.
///
/// Verification failures get the targeted remediation message; everything
/// else shows the backend's own message when it sent one, or the generic
/// fallback.
#[must_use]
pub fn order_failure_message(error: &CommerceError) -> String {
    match error {
        CommerceError::VerificationRequired { missing } => verification_message(missing),
        other => other
            .backend_message()
            .map_or_else(|| ORDER_FAILED_MESSAGE.to_string(), str::to_owned),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use pasal_core::CartItemId;

    use crate::commerce::types::{CartItem, ProductRef};

    use super::*;

    fn address(id: &str, is_default: bool) -> Address {
        Address {
            id: AddressId::new(id),
            full_name: "Sita Sharma".to_string(),
            phone: "9841000000".to_string(),
            province: "Bagmati".to_string(),
            district: "Kathmandu".to_string(),
            municipality: "Kathmandu".to_string(),
            ward_no: "7".to_string(),
            area: "Baneshwor".to_string(),
            landmark: None,
            is_default,
        }
    }

    fn draft_item(product_id: &str, quantity: u32) -> OrderDraftItem {
        OrderDraftItem {
            product_id: ProductId::new(product_id),
            quantity,
        }
    }

    #[test]
    fn test_explicit_selection_wins() {
        let addresses = vec![address("a1", true), address("a2", false)];
        let selected = AddressId::new("a2");
        assert_eq!(
            effective_address_id(&addresses, Some(&selected)),
            Some(AddressId::new("a2"))
        );
    }

    #[test]
    fn test_default_beats_first() {
        let addresses = vec![address("a1", false), address("a2", true)];
        assert_eq!(
            effective_address_id(&addresses, None),
            Some(AddressId::new("a2"))
        );
    }

    #[test]
    fn test_first_when_no_default() {
        let addresses = vec![address("a1", false), address("a2", false)];
        assert_eq!(
            effective_address_id(&addresses, None),
            Some(AddressId::new("a1"))
        );
    }

    #[test]
    fn test_no_addresses_yields_none() {
        assert_eq!(effective_address_id(&[], None), None);
    }

    #[test]
    fn test_draft_requires_address() {
        let result = build_order_draft(
            None,
            vec![draft_item("p1", 1)],
            PaymentMethod::CashOnDelivery,
            None,
        );
        assert_eq!(result.unwrap_err(), NO_ADDRESS_MESSAGE);
    }

    #[test]
    fn test_draft_requires_items() {
        let result = build_order_draft(
            Some(AddressId::new("a1")),
            vec![],
            PaymentMethod::CashOnDelivery,
            None,
        );
        assert_eq!(result.unwrap_err(), EMPTY_CART_MESSAGE);
    }

    #[test]
    fn test_missing_address_reported_before_empty_cart() {
        let result = build_order_draft(None, vec![], PaymentMethod::CashOnDelivery, None);
        assert_eq!(result.unwrap_err(), NO_ADDRESS_MESSAGE);
    }

    #[test]
    fn test_draft_carries_selected_payment_method() {
        let draft = build_order_draft(
            Some(AddressId::new("a1")),
            vec![draft_item("p1", 2)],
            PaymentMethod::Khalti,
            None,
        )
        .unwrap();
        assert_eq!(draft.payment_method, PaymentMethod::Khalti);
        assert_eq!(draft.items, vec![draft_item("p1", 2)]);
    }

    #[test]
    fn test_note_is_trimmed() {
        let draft = build_order_draft(
            Some(AddressId::new("a1")),
            vec![draft_item("p1", 1)],
            PaymentMethod::CashOnDelivery,
            Some("  ring the bell  "),
        )
        .unwrap();
        assert_eq!(draft.note.as_deref(), Some("ring the bell"));
    }

    #[test]
    fn test_whitespace_note_dropped() {
        let draft = build_order_draft(
            Some(AddressId::new("a1")),
            vec![draft_item("p1", 1)],
            PaymentMethod::CashOnDelivery,
            Some("   "),
        )
        .unwrap();
        assert_eq!(draft.note, None);
    }

    #[test]
    fn test_verification_message_joins_fields() {
        let missing = vec!["email".to_string(), "phone".to_string()];
        assert_eq!(
            verification_message(&missing),
            "Verify email & phone to place orders."
        );
    }

    #[test]
    fn test_verification_message_single_field() {
        let missing = vec!["phone".to_string()];
        assert_eq!(verification_message(&missing), "Verify phone to place orders.");
    }

    #[test]
    fn test_verification_message_fallback() {
        assert_eq!(
            verification_message(&[]),
            "Verify email/phone verification to place orders."
        );
    }

    #[test]
    fn test_failure_message_uses_backend_message() {
        let error = CommerceError::Backend {
            status: 409,
            message: "Product out of stock".to_string(),
        };
        assert_eq!(order_failure_message(&error), "Product out of stock");
    }

    #[test]
    fn test_failure_message_generic_fallback() {
        let error = CommerceError::Malformed("bad shape".to_string());
        assert_eq!(order_failure_message(&error), ORDER_FAILED_MESSAGE);
    }

    #[test]
    fn test_failure_message_verification_variant() {
        let error = CommerceError::VerificationRequired {
            missing: vec!["phone".to_string()],
        };
        assert_eq!(
            order_failure_message(&error),
            "Verify phone to place orders."
        );
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let cart = Cart {
            items: vec![CartItem {
                id: CartItemId::new("line-1"),
                product: ProductRef {
                    id: ProductId::new("p1"),
                    name: "Wai Wai Noodles".to_string(),
                    price: Money::new(Decimal::from(25)),
                    image: None,
                },
                quantity: 3,
            }],
            total: Money::new(Decimal::from(75)),
        };

        let snapshot = CartSnapshot::from_cart(&cart);
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: CartSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.items.len(), 1);
        assert_eq!(restored.items[0].quantity, 3);
        assert_eq!(restored.total, Money::new(Decimal::from(75)));
        assert_eq!(
            restored.draft_items(),
            vec![OrderDraftItem {
                product_id: ProductId::new("p1"),
                quantity: 3,
            }]
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CartSnapshot::from_cart(&Cart::default());
        assert!(snapshot.is_empty());
        assert!(snapshot.draft_items().is_empty());
    }
}
