//! Wire-format payloads for the commerce backend.
//!
//! The backend is loose about shapes: entity ids arrive as `id` or `_id`
//! depending on the endpoint, list responses are sometimes wrapped in
//! `{"data": [...]}` and sometimes bare arrays, numbers show up as strings,
//! and error messages can be a string or an array of strings. Everything
//! here deserializes those shapes exactly as sent; [`convert`](super::convert)
//! maps them onto canonical types so only this module ever deals with the
//! variance.
//!
//! Request bodies the storefront sends live here too, since their field
//! casing belongs to the wire and not to the domain.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pasal_core::{Money, OrderStatus, PaymentMethod};

use super::types::{NewAddress, OrderDraft};

// =============================================================================
// Shape-variance primitives
// =============================================================================

/// An entity id that may arrive under `id` or `_id`.
///
/// `id` wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireId {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "_id")]
    pub underscore_id: Option<String>,
}

impl WireId {
    /// The effective id, if either field was present and non-empty.
    #[must_use]
    pub fn into_id(self) -> Option<String> {
        self.id
            .filter(|id| !id.is_empty())
            .or_else(|| self.underscore_id.filter(|id| !id.is_empty()))
    }
}

/// A list that may arrive bare or wrapped in `{"data": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireList<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> WireList<T> {
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(items) => items,
        }
    }
}

impl<T> Default for WireList<T> {
    fn default() -> Self {
        Self::Bare(Vec::new())
    }
}

/// A value that may arrive as a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    Text(String),
    Number(i64),
}

impl WireScalar {
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

/// An image that may arrive as a bare URL string or `{"url": ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireImage {
    Url(String),
    Object { url: String },
}

impl WireImage {
    #[must_use]
    pub fn into_url(self) -> String {
        match self {
            Self::Url(url) | Self::Object { url } => url,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    #[serde(flatten)]
    pub id: WireId,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub images: Vec<WireImage>,
    #[serde(default)]
    pub brand: Option<WireBrand>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireBrand {
    #[serde(flatten)]
    pub id: WireId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// The abbreviated product embedded in cart, wishlist and order lines.
#[derive(Debug, Clone, Deserialize)]
pub struct WireProductRef {
    #[serde(flatten)]
    pub id: WireId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub image: Option<WireImage>,
    #[serde(default)]
    pub images: Vec<WireImage>,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireCart {
    #[serde(default)]
    pub items: Vec<WireCartItem>,
    #[serde(default)]
    pub total: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireCartItem {
    #[serde(flatten)]
    pub id: WireId,
    #[serde(default)]
    pub product: Option<WireProductRef>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

// =============================================================================
// Addresses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAddress {
    #[serde(flatten)]
    pub id: WireId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub ward_no: Option<WireScalar>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrder {
    #[serde(flatten)]
    pub id: WireId,
    #[serde(default)]
    pub order_number: Option<WireScalar>,
    /// Unknown statuses deserialize to [`OrderStatus::Unknown`] rather than
    /// failing the whole list.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<WireOrderItem>,
    #[serde(default)]
    pub address: Option<WireAddress>,
    /// Kept as a raw string; an unknown gateway must not fail the payload.
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub subtotal: Option<Money>,
    #[serde(default)]
    pub delivery_charge: Option<Money>,
    #[serde(default)]
    pub discount: Option<Money>,
    #[serde(default)]
    pub total: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireOrderItem {
    #[serde(default)]
    pub product: Option<WireProductRef>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub total: Option<Money>,
}

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WireWishlistItem {
    #[serde(flatten)]
    pub id: WireId,
    #[serde(default)]
    pub product: Option<WireProductRef>,
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<WireUser>,
    #[serde(default)]
    pub otp_required: Option<bool>,
    #[serde(default)]
    pub requires_otp: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    #[serde(flatten)]
    pub id: WireId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Error envelope
// =============================================================================

/// The body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireError {
    /// A string, or an array of strings from field validation.
    #[serde(default)]
    pub message: Option<Value>,
    /// Verification fields still missing, when verification gates an action.
    #[serde(default)]
    pub missing: Option<Vec<String>>,
}

impl WireError {
    /// Normalize `message` to a single line; array messages join with `", "`.
    #[must_use]
    pub fn message_text(&self) -> Option<String> {
        match &self.message {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Array(parts)) => {
                let joined = parts
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                (!joined.is_empty()).then_some(joined)
            }
            _ => None,
        }
    }
}

// =============================================================================
// Request bodies
// =============================================================================

/// `POST /orders` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateRequest {
    pub address_id: String,
    pub items: Vec<OrderItemInput>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Always `true`: order creation and cart clearing are one backend
    /// transaction.
    pub clear_cart: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: String,
    pub quantity: u32,
}

impl From<&OrderDraft> for OrderCreateRequest {
    fn from(draft: &OrderDraft) -> Self {
        Self {
            address_id: draft.address_id.as_str().to_owned(),
            items: draft
                .items
                .iter()
                .map(|item| OrderItemInput {
                    product_id: item.product_id.as_str().to_owned(),
                    quantity: item.quantity,
                })
                .collect(),
            payment_method: draft.payment_method,
            note: draft.note.clone(),
            clear_cart: true,
        }
    }
}

/// `POST /cart/items` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// `PATCH /cart/items/{id}` body.
#[derive(Debug, Clone, Serialize)]
pub struct CartUpdateRequest {
    pub quantity: u32,
}

/// `POST /users/addresses` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCreateRequest {
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub district: String,
    pub municipality: String,
    pub ward_no: String,
    pub area: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub is_default: bool,
}

impl From<&NewAddress> for AddressCreateRequest {
    fn from(address: &NewAddress) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            province: address.province.clone(),
            district: address.district.clone(),
            municipality: address.municipality.clone(),
            ward_no: address.ward_no.clone(),
            area: address.area.clone(),
            landmark: address.landmark.clone(),
            is_default: address.is_default,
        }
    }
}

/// `POST /wishlist` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistAddRequest {
    pub product_id: String,
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/login/verify-otp` body.
#[derive(Debug, Clone, Serialize)]
pub struct OtpVerifyRequest {
    pub email: String,
    pub otp: String,
}

/// `POST /auth/login/resend-otp` body.
#[derive(Debug, Clone, Serialize)]
pub struct OtpResendRequest {
    pub email: String,
}
