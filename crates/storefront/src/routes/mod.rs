//! Route handlers for the storefront.
//!
//! # Route Structure
//!
//! - `GET /` - Home page
//! - `GET /health` - Liveness check
//! - `GET /health/ready` - Readiness check (probes the commerce backend)
//! - `GET /products` - Product listing (search and brand filters)
//! - `GET /products/{slug}` - Product detail
//! - `GET /cart` - Cart page
//! - `POST /cart/add` - Add to cart
//! - `POST /cart/update` - Change a line's quantity (HTMX fragment)
//! - `POST /cart/remove` - Remove a line (HTMX fragment)
//! - `GET /cart/count` - Cart badge count (HTMX fragment)
//! - `GET /checkout` - Checkout page
//! - `POST /checkout/place` - Place the order
//! - `GET /checkout/confirmation` - Order confirmation
//! - `GET /auth/login`, `POST /auth/login` - Password login
//! - `GET /auth/verify-otp`, `POST /auth/verify-otp` - Login OTP step
//! - `POST /auth/verify-otp/resend` - Resend the login OTP
//! - `POST /auth/logout` - Log out
//! - `GET /account/orders` - Order history
//! - `GET /account/orders/{id}` - Order detail
//! - `POST /account/orders/{id}/cancel` - Cancel an order
//! - `GET /account/addresses`, `POST /account/addresses` - Saved addresses
//! - `GET /wishlist` - Wishlist page
//! - `POST /wishlist/toggle` - Add or remove a product
//! - `POST /wishlist/remove` - Remove an entry

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod home;
pub mod orders;
pub mod products;
pub mod wishlist;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the complete route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(health_routes())
        .merge(product_routes())
        .merge(cart_routes())
        .merge(checkout_routes())
        .merge(auth_routes())
        .merge(account_routes())
        .merge(wishlist_routes())
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/count", get(cart::count))
}

fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::show))
        .route("/checkout/place", post(checkout::place))
        .route("/checkout/confirmation", get(checkout::confirmation))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route(
            "/auth/verify-otp",
            get(auth::verify_otp_page).post(auth::verify_otp),
        )
        .route("/auth/verify-otp/resend", post(auth::resend_otp))
        .route("/auth/logout", post(auth::logout))
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account/orders", get(orders::index))
        .route("/account/orders/{id}", get(orders::show))
        .route("/account/orders/{id}/cancel", post(orders::cancel))
        .route(
            "/account/addresses",
            get(addresses::index).post(addresses::create),
        )
}

fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/wishlist", get(wishlist::index))
        .route("/wishlist/toggle", post(wishlist::toggle))
        .route("/wishlist/remove", post(wishlist::remove))
}
