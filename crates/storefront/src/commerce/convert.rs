//! Wire-to-canonical conversion functions.
//!
//! This is the single normalization boundary: every backend response passes
//! through here exactly once, and everything downstream works with
//! [`types`](super::types) only. Entries without a usable id are dropped
//! with a warning rather than failing the whole response.

use chrono::{DateTime, Utc};
use tracing::warn;

use pasal_core::{
    AddressId, BrandId, CartItemId, Money, OrderId, OrderStatus, PaymentMethod, ProductId, UserId,
    WishlistItemId,
};

use super::types::{
    Address, AuthSession, Brand, Cart, CartItem, LoginOutcome, Order, OrderAddress, OrderItem,
    Product, ProductRef, User, WishlistItem,
};
use super::wire::{
    WireAddress, WireBrand, WireCart, WireCartItem, WireList, WireLoginResponse, WireOrder,
    WireOrderItem, WireProduct, WireProductRef, WireUser, WireWishlistItem,
};

// =============================================================================
// Catalog
// =============================================================================

pub fn convert_product(wire: WireProduct) -> Option<Product> {
    let id = wire.id.into_id()?;

    // Stock is reported either as a boolean flag or a count.
    let in_stock = wire
        .in_stock
        .or_else(|| wire.stock.map(|stock| stock > 0))
        .unwrap_or(true);

    Some(Product {
        slug: wire.slug.filter(|slug| !slug.is_empty()).unwrap_or_else(|| id.clone()),
        id: ProductId::new(id),
        name: wire.name.unwrap_or_default(),
        description: wire.description.filter(|text| !text.is_empty()),
        price: wire.price.unwrap_or_default(),
        images: wire.images.into_iter().map(super::wire::WireImage::into_url).collect(),
        brand: wire.brand.and_then(convert_brand),
        in_stock,
    })
}

pub fn convert_products(list: WireList<WireProduct>) -> Vec<Product> {
    list.into_vec()
        .into_iter()
        .filter_map(|wire| {
            let product = convert_product(wire);
            if product.is_none() {
                warn!("Dropping product without an id from catalog response");
            }
            product
        })
        .collect()
}

pub fn convert_brand(wire: WireBrand) -> Option<Brand> {
    let id = wire.id.into_id()?;
    let name = wire.name.unwrap_or_default();
    Some(Brand {
        slug: wire.slug.filter(|slug| !slug.is_empty()).unwrap_or_else(|| id.clone()),
        id: BrandId::new(id),
        name,
    })
}

pub fn convert_brands(list: WireList<WireBrand>) -> Vec<Brand> {
    list.into_vec().into_iter().filter_map(convert_brand).collect()
}

pub fn convert_product_ref(wire: WireProductRef) -> Option<ProductRef> {
    let id = wire.id.into_id()?;
    let image = wire
        .image
        .map(super::wire::WireImage::into_url)
        .or_else(|| wire.images.into_iter().next().map(super::wire::WireImage::into_url));

    Some(ProductRef {
        id: ProductId::new(id),
        name: wire.name.unwrap_or_default(),
        price: wire.price.unwrap_or_default(),
        image,
    })
}

// =============================================================================
// Cart
// =============================================================================

pub fn convert_cart(wire: WireCart) -> Cart {
    let items = wire
        .items
        .into_iter()
        .filter_map(|item| {
            let item = convert_cart_item(item);
            if item.is_none() {
                warn!("Dropping cart line without an id or product");
            }
            item
        })
        .collect();

    Cart {
        items,
        total: wire.total.unwrap_or_default(),
    }
}

fn convert_cart_item(wire: WireCartItem) -> Option<CartItem> {
    let id = wire.id.into_id()?;
    let product = convert_product_ref(wire.product?)?;
    Some(CartItem {
        id: CartItemId::new(id),
        product,
        quantity: wire.quantity.unwrap_or(1),
    })
}

// =============================================================================
// Addresses
// =============================================================================

pub fn convert_address(wire: WireAddress) -> Option<Address> {
    let id = wire.id.into_id()?;
    Some(Address {
        id: AddressId::new(id),
        full_name: wire.full_name.unwrap_or_default(),
        phone: wire.phone.unwrap_or_default(),
        province: wire.province.unwrap_or_default(),
        district: wire.district.unwrap_or_default(),
        municipality: wire.municipality.unwrap_or_default(),
        ward_no: wire.ward_no.map(super::wire::WireScalar::into_string).unwrap_or_default(),
        area: wire.area.unwrap_or_default(),
        landmark: wire.landmark.filter(|text| !text.is_empty()),
        is_default: wire.is_default.unwrap_or(false),
    })
}

pub fn convert_addresses(list: WireList<WireAddress>) -> Vec<Address> {
    list.into_vec()
        .into_iter()
        .filter_map(|wire| {
            let address = convert_address(wire);
            if address.is_none() {
                warn!("Dropping address without an id");
            }
            address
        })
        .collect()
}

// =============================================================================
// Orders
// =============================================================================

pub fn convert_order(wire: WireOrder) -> Option<Order> {
    let id = wire.id.into_id()?;

    let order_number = wire
        .order_number
        .map(super::wire::WireScalar::into_string)
        .unwrap_or_else(|| id.clone());

    let placed_at = wire.created_at.as_deref().and_then(parse_timestamp);

    Some(Order {
        id: OrderId::new(id),
        order_number,
        status: wire.status.unwrap_or(OrderStatus::Pending),
        placed_at,
        items: wire.items.into_iter().map(convert_order_item).collect(),
        address: wire.address.map(convert_order_address),
        payment_method: wire.payment_method.as_deref().and_then(PaymentMethod::parse),
        subtotal: wire.subtotal.unwrap_or_default(),
        delivery_charge: wire.delivery_charge.unwrap_or_default(),
        discount: wire.discount.unwrap_or_default(),
        total: wire.total.unwrap_or_default(),
    })
}

pub fn convert_orders(list: WireList<WireOrder>) -> Vec<Order> {
    list.into_vec()
        .into_iter()
        .filter_map(|wire| {
            let order = convert_order(wire);
            if order.is_none() {
                warn!("Dropping order without an id");
            }
            order
        })
        .collect()
}

fn convert_order_item(wire: WireOrderItem) -> OrderItem {
    let product_name = wire.product.and_then(|product| product.name);
    OrderItem {
        name: product_name
            .or(wire.name)
            .unwrap_or_else(|| "Item".to_string()),
        quantity: wire.quantity.unwrap_or(1),
        total: wire.total.unwrap_or_default(),
    }
}

fn convert_order_address(wire: WireAddress) -> OrderAddress {
    OrderAddress {
        full_name: wire.full_name.unwrap_or_default(),
        area: wire.area.unwrap_or_default(),
        district: wire.district.unwrap_or_default(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
}

// =============================================================================
// Wishlist
// =============================================================================

pub fn convert_wishlist(list: WireList<WireWishlistItem>) -> Vec<WishlistItem> {
    list.into_vec()
        .into_iter()
        .filter_map(|wire| {
            let item = convert_wishlist_item(wire);
            if item.is_none() {
                warn!("Dropping wishlist entry without an id or product");
            }
            item
        })
        .collect()
}

fn convert_wishlist_item(wire: WireWishlistItem) -> Option<WishlistItem> {
    let id = wire.id.into_id()?;
    let product = convert_product_ref(wire.product?)?;
    Some(WishlistItem {
        id: WishlistItemId::new(id),
        product,
    })
}

// =============================================================================
// Auth
// =============================================================================

pub fn convert_user(wire: WireUser) -> Option<User> {
    let id = wire.id.into_id()?;
    Some(User {
        id: UserId::new(id),
        email: wire.email.unwrap_or_default(),
        name: wire.name.filter(|name| !name.is_empty()),
    })
}

/// Interpret a login response.
///
/// `None` means the response fit neither outcome (no token and no OTP
/// flag); the client reports that as a malformed response.
pub fn convert_login(wire: WireLoginResponse) -> Option<LoginOutcome> {
    if wire.otp_required.or(wire.requires_otp).unwrap_or(false) {
        return Some(LoginOutcome::OtpRequired);
    }

    let token = wire
        .token
        .or(wire.access_token)
        .filter(|token| !token.is_empty())?;
    let user = convert_user(wire.user?)?;

    Some(LoginOutcome::LoggedIn(AuthSession { token, user }))
}
