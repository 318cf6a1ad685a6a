//! HTTP client for the commerce backend.
//!
//! Plain JSON over HTTP via `reqwest`. Catalog reads go through a `moka`
//! cache with a 5-minute TTL; everything user-scoped (cart, orders,
//! addresses, wishlist) is fetched fresh on every call, because those are
//! exactly the responses the storefront re-reads after a mutation.
//!
//! Authenticated calls take the caller's bearer token per request; the
//! client itself holds no credentials.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use pasal_core::{AddressId, CartItemId, Email, OrderId, ProductId, WishlistItemId};

use crate::config::CommerceApiConfig;

use super::cache::CacheValue;
use super::types::{
    Address, AuthSession, Brand, Cart, LoginOutcome, NewAddress, Order, OrderDraft, Product,
    WishlistItem,
};
use super::wire::{
    AddressCreateRequest, CartAddRequest, CartUpdateRequest, LoginRequest, OrderCreateRequest,
    OtpResendRequest, OtpVerifyRequest, WireAddress, WireBrand, WireCart, WireError, WireList,
    WireLoginResponse, WireOrder, WireProduct, WireWishlistItem, WishlistAddRequest,
};
use super::{CommerceError, VERIFICATION_REQUIRED_MESSAGE, convert};

/// Client for the commerce backend.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    cache: Cache<String, CacheValue>,
}

impl CommerceClient {
    /// Create a new client for the given backend.
    #[must_use]
    pub fn new(config: &CommerceApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CommerceClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
                timeout: config.timeout,
                cache,
            }),
        }
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let mut builder = self.inner.client.request(method, url).timeout(self.inner.timeout);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and decode its JSON body.
    async fn execute<T: DeserializeOwned>(
        builder: reqwest::RequestBuilder,
    ) -> Result<T, CommerceError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Self::classify_failure(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(
                error = %e,
                response_text = %text.chars().take(500).collect::<String>(),
                "Failed to parse commerce API response"
            );
            CommerceError::Parse(e)
        })
    }

    /// Send a request and discard its body.
    ///
    /// Used for mutations: callers read back state with a fresh fetch
    /// instead of trusting whatever the mutation response carried.
    async fn execute_discard(builder: reqwest::RequestBuilder) -> Result<(), CommerceError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await?;
        Err(Self::classify_failure(status, &text))
    }

    /// Map a non-2xx response onto a [`CommerceError`].
    ///
    /// This is the one place backend failures are classified; the
    /// verification gate is recognized here by its exact message.
    fn classify_failure(status: StatusCode, body: &str) -> CommerceError {
        let wire: WireError = serde_json::from_str(body).unwrap_or_default();
        let message = wire.message_text();

        debug!(
            status = %status,
            message = message.as_deref().unwrap_or(""),
            "Commerce API returned an error response"
        );

        if message.as_deref() == Some(VERIFICATION_REQUIRED_MESSAGE) {
            return CommerceError::VerificationRequired {
                missing: wire.missing.unwrap_or_default(),
            };
        }

        match status {
            StatusCode::UNAUTHORIZED => CommerceError::Unauthorized,
            StatusCode::NOT_FOUND => CommerceError::NotFound(
                message.unwrap_or_else(|| "resource not found".to_string()),
            ),
            _ => CommerceError::Backend {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
            },
        }
    }

    // =========================================================================
    // Catalog (cached)
    // =========================================================================

    /// Fetch the product listing, optionally filtered.
    ///
    /// Only the unfiltered listing is cached; searches and brand filters
    /// are too variable to be worth cache slots.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        search: Option<&str>,
        brand: Option<&str>,
    ) -> Result<Vec<Product>, CommerceError> {
        let cache_key = "products:all".to_string();

        if search.is_none()
            && brand.is_none()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for product listing");
            return Ok(products);
        }

        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(search) = search {
            query.push(("search", search));
        }
        if let Some(brand) = brand {
            query.push(("brand", brand));
        }

        let builder = self.request(Method::GET, "/products", None).query(&query);
        let list: WireList<WireProduct> = Self::execute(builder).await?;
        let products = convert::convert_products(list);

        if search.is_none() && brand.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// Fetch a single product by slug.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] if the product does not exist.
    #[instrument(skip(self))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, CommerceError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let builder = self.request(Method::GET, &format!("/products/{slug}"), None);
        let wire: WireProduct = Self::execute(builder).await?;
        let product = convert::convert_product(wire)
            .ok_or_else(|| CommerceError::NotFound(format!("Product not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Fetch the featured products for the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_featured_products(&self, limit: usize) -> Result<Vec<Product>, CommerceError> {
        let cache_key = format!("featured:{limit}");

        if let Some(CacheValue::Featured(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for featured products");
            return Ok(products);
        }

        let limit_param = limit.to_string();
        let builder = self
            .request(Method::GET, "/products/featured", None)
            .query(&[("limit", limit_param.as_str())]);
        let list: WireList<WireProduct> = Self::execute(builder).await?;
        let products = convert::convert_products(list);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Featured(products.clone()))
            .await;

        Ok(products)
    }

    /// Fetch all brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_brands(&self) -> Result<Vec<Brand>, CommerceError> {
        let cache_key = "brands".to_string();

        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let builder = self.request(Method::GET, "/brands", None);
        let list: WireList<WireBrand> = Self::execute(builder).await?;
        let brands = convert::convert_brands(list);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    // =========================================================================
    // Cart (never cached)
    // =========================================================================

    /// Fetch the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip_all)]
    pub async fn get_cart(&self, token: &str) -> Result<Cart, CommerceError> {
        let builder = self.request(Method::GET, "/cart", Some(token));
        let wire: WireCart = Self::execute(builder).await?;
        Ok(convert::convert_cart(wire))
    }

    /// Add a product to the cart. The response is discarded; callers
    /// re-fetch the cart for the authoritative state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(product_id = %product_id, quantity))]
    pub async fn add_to_cart(
        &self,
        token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let body = CartAddRequest {
            product_id: product_id.as_str().to_string(),
            quantity,
        };
        let builder = self.request(Method::POST, "/cart/items", Some(token)).json(&body);
        Self::execute_discard(builder).await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(item_id = %item_id, quantity))]
    pub async fn update_cart_item(
        &self,
        token: &str,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let body = CartUpdateRequest { quantity };
        let builder = self
            .request(Method::PATCH, &format!("/cart/items/{item_id}"), Some(token))
            .json(&body);
        Self::execute_discard(builder).await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(item_id = %item_id))]
    pub async fn remove_cart_item(
        &self,
        token: &str,
        item_id: &CartItemId,
    ) -> Result<(), CommerceError> {
        let builder = self.request(Method::DELETE, &format!("/cart/items/{item_id}"), Some(token));
        Self::execute_discard(builder).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Fetch the customer's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn get_addresses(&self, token: &str) -> Result<Vec<Address>, CommerceError> {
        let builder = self.request(Method::GET, "/users/addresses", Some(token));
        let list: WireList<WireAddress> = Self::execute(builder).await?;
        Ok(convert::convert_addresses(list))
    }

    /// Create a delivery address. The response is discarded; callers
    /// re-fetch the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn create_address(
        &self,
        token: &str,
        address: &NewAddress,
    ) -> Result<(), CommerceError> {
        let body = AddressCreateRequest::from(address);
        let builder = self.request(Method::POST, "/users/addresses", Some(token)).json(&body);
        Self::execute_discard(builder).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order.
    ///
    /// The backend clears the cart as part of order creation, so a
    /// subsequent cart fetch reflects the empty cart without extra calls.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::VerificationRequired`] when the account has
    /// not completed verification, or another error if the request fails.
    #[instrument(skip_all, fields(address_id = %draft.address_id, item_count = draft.items.len()))]
    pub async fn create_order(&self, token: &str, draft: &OrderDraft) -> Result<(), CommerceError> {
        let body = OrderCreateRequest::from(draft);
        let builder = self.request(Method::POST, "/orders", Some(token)).json(&body);
        Self::execute_discard(builder).await
    }

    /// Fetch the customer's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn get_orders(&self, token: &str) -> Result<Vec<Order>, CommerceError> {
        let builder = self.request(Method::GET, "/orders", Some(token));
        let list: WireList<WireOrder> = Self::execute(builder).await?;
        Ok(convert::convert_orders(list))
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] if the order does not exist.
    #[instrument(skip_all, fields(order_id = %order_id))]
    pub async fn get_order(&self, token: &str, order_id: &OrderId) -> Result<Order, CommerceError> {
        let builder = self.request(Method::GET, &format!("/orders/{order_id}"), Some(token));
        let wire: WireOrder = Self::execute(builder).await?;
        convert::convert_order(wire)
            .ok_or_else(|| CommerceError::NotFound(format!("Order not found: {order_id}")))
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order cannot be cancelled.
    #[instrument(skip_all, fields(order_id = %order_id))]
    pub async fn cancel_order(&self, token: &str, order_id: &OrderId) -> Result<(), CommerceError> {
        let builder = self.request(Method::POST, &format!("/orders/{order_id}/cancel"), Some(token));
        Self::execute_discard(builder).await
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Fetch the customer's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn get_wishlist(&self, token: &str) -> Result<Vec<WishlistItem>, CommerceError> {
        let builder = self.request(Method::GET, "/wishlist", Some(token));
        let list: WireList<WireWishlistItem> = Self::execute(builder).await?;
        Ok(convert::convert_wishlist(list))
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<(), CommerceError> {
        let body = WishlistAddRequest {
            product_id: product_id.as_str().to_string(),
        };
        let builder = self.request(Method::POST, "/wishlist", Some(token)).json(&body);
        Self::execute_discard(builder).await
    }

    /// Remove a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(item_id = %item_id))]
    pub async fn remove_from_wishlist(
        &self,
        token: &str,
        item_id: &WishlistItemId,
    ) -> Result<(), CommerceError> {
        let builder = self.request(Method::DELETE, &format!("/wishlist/{item_id}"), Some(token));
        Self::execute_discard(builder).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Attempt a password login.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Unauthorized`] for bad credentials, or
    /// [`CommerceError::Malformed`] if the response fits no known shape.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<LoginOutcome, CommerceError> {
        let body = LoginRequest {
            email: email.as_str().to_string(),
            password: password.to_string(),
        };
        let builder = self.request(Method::POST, "/auth/login", None).json(&body);
        let wire: WireLoginResponse = Self::execute(builder).await?;
        convert::convert_login(wire).ok_or_else(|| {
            CommerceError::Malformed("login response carried neither token nor OTP flag".to_string())
        })
    }

    /// Verify a login one-time code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is rejected or the response carries no
    /// token.
    #[instrument(skip_all)]
    pub async fn verify_login_otp(
        &self,
        email: &Email,
        otp: &str,
    ) -> Result<AuthSession, CommerceError> {
        let body = OtpVerifyRequest {
            email: email.as_str().to_string(),
            otp: otp.to_string(),
        };
        let builder = self.request(Method::POST, "/auth/login/verify-otp", None).json(&body);
        let wire: WireLoginResponse = Self::execute(builder).await?;
        match convert::convert_login(wire) {
            Some(LoginOutcome::LoggedIn(session)) => Ok(session),
            _ => Err(CommerceError::Malformed(
                "OTP verification response carried no token".to_string(),
            )),
        }
    }

    /// Request a fresh login one-time code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn resend_login_otp(&self, email: &Email) -> Result<(), CommerceError> {
        let body = OtpResendRequest {
            email: email.as_str().to_string(),
        };
        let builder = self.request(Method::POST, "/auth/login/resend-otp", None).json(&body);
        Self::execute_discard(builder).await
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Probe the backend's health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), CommerceError> {
        let builder = self.request(Method::GET, "/health", None);
        Self::execute_discard(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unauthorized() {
        let error = CommerceClient::classify_failure(StatusCode::UNAUTHORIZED, "{}");
        assert!(matches!(error, CommerceError::Unauthorized));
    }

    #[test]
    fn test_classify_not_found_with_message() {
        let error = CommerceClient::classify_failure(
            StatusCode::NOT_FOUND,
            r#"{"message": "Product not found"}"#,
        );
        match error {
            CommerceError::NotFound(message) => assert_eq!(message, "Product not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_verification_gate() {
        let error = CommerceClient::classify_failure(
            StatusCode::FORBIDDEN,
            r#"{"message": "Insufficient verification to place orders", "missing": ["email", "phone"]}"#,
        );
        match error {
            CommerceError::VerificationRequired { missing } => {
                assert_eq!(missing, vec!["email".to_string(), "phone".to_string()]);
            }
            other => panic!("expected VerificationRequired, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_verification_gate_without_missing_list() {
        let error = CommerceClient::classify_failure(
            StatusCode::FORBIDDEN,
            r#"{"message": "Insufficient verification to place orders"}"#,
        );
        assert!(matches!(
            error,
            CommerceError::VerificationRequired { missing } if missing.is_empty()
        ));
    }

    #[test]
    fn test_classify_array_message() {
        let error = CommerceClient::classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"message": ["quantity must be positive", "productId is required"]}"#,
        );
        match error {
            CommerceError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "quantity must be positive, productId is required");
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_unparseable_body() {
        let error =
            CommerceClient::classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        match error {
            CommerceError::Backend { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("500"));
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_verification_message_must_match_exactly() {
        // A different message must not trip the verification branch.
        let error = CommerceClient::classify_failure(
            StatusCode::FORBIDDEN,
            r#"{"message": "Insufficient funds to place orders"}"#,
        );
        assert!(matches!(error, CommerceError::Backend { .. }));
    }
}
