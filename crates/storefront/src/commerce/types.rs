//! Canonical commerce types.
//!
//! These are the shapes the rest of the storefront works with. They are
//! produced exclusively by [`convert`](super::convert) from wire payloads;
//! ids are always populated, amounts are always [`Money`], and optionality
//! reflects genuine domain optionality rather than backend shape variance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pasal_core::{
    AddressId, BrandId, CartItemId, Money, OrderId, OrderStatus, PaymentMethod, ProductId, UserId,
    WishlistItemId,
};

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// URL path segment; falls back to the id when the backend has none.
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub images: Vec<String>,
    pub brand: Option<Brand>,
    pub in_stock: bool,
}

/// A product brand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: String,
}

/// The product fields embedded in cart, wishlist and order lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
}

/// One line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: ProductRef,
    pub quantity: u32,
}

/// The customer's cart as last reported by the backend.
///
/// `total` is computed server-side; the storefront displays it and never
/// recomputes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total: Money,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines in the cart (not units).
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// A saved delivery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub district: String,
    pub municipality: String,
    pub ward_no: String,
    pub area: String,
    pub landmark: Option<String>,
    pub is_default: bool,
}

impl Address {
    /// One-line summary for address pickers: area, municipality ward,
    /// district and province.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}, {} - {}, {}, {}",
            self.area, self.municipality, self.ward_no, self.district, self.province
        )
    }
}

/// Input for creating a delivery address.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub district: String,
    pub municipality: String,
    pub ward_no: String,
    pub area: String,
    pub landmark: Option<String>,
    pub is_default: bool,
}

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraftItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// An order ready to submit.
///
/// Assembled at submission time from the checkout form; it never persists
/// anywhere on the storefront side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub address_id: AddressId,
    pub items: Vec<OrderDraftItem>,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
}

/// One line of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Line total as computed by the backend.
    pub total: Money,
}

/// The delivery address snapshot attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAddress {
    pub full_name: String,
    pub area: String,
    pub district: String,
}

/// A placed order.
///
/// All amounts, including the delivery charge and any discount, are
/// backend-computed; they only exist once an order does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub placed_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
    pub address: Option<OrderAddress>,
    pub payment_method: Option<PaymentMethod>,
    pub subtotal: Money,
    pub delivery_charge: Money,
    pub discount: Money,
    pub total: Money,
}

/// A wishlist entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product: ProductRef,
}

/// A commerce backend user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
}

/// An established backend session: the bearer token and the user it was
/// issued to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Outcome of a password login attempt.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Credentials accepted and a token issued.
    LoggedIn(AuthSession),
    /// Credentials accepted but the backend wants a one-time code first.
    OtpRequired,
}
