//! Integration harness for the Pasal storefront.
//!
//! Each test spins up two in-process servers on ephemeral ports: a mock of
//! the commerce backend and the real storefront application pointed at it.
//! Tests drive the storefront over HTTP with a cookie-holding client, the
//! way a browser would, and inspect the mock's request log to verify what
//! reached the backend - and, just as often, what never did.
//!
//! Run with: `cargo test -p pasal-integration-tests`

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};

use pasal_storefront::config::{CommerceApiConfig, StorefrontConfig};
use pasal_storefront::{AppState, app};

/// Bearer token the mock backend issues on login and requires thereafter.
pub const TEST_TOKEN: &str = "tok-integration-1";

/// The customer every test logs in as.
pub const TEST_USER_EMAIL: &str = "asha@example.com";

/// Password the mock backend accepts.
pub const TEST_PASSWORD: &str = "correct-horse";

/// The one-time code the mock backend accepts.
pub const VALID_OTP: &str = "123456";

/// Signing secret for the storefront's session cookies.
const SESSION_SECRET: &str = "integration-test-session-secret-0123456789abcdef0123456789abcdef";

// =============================================================================
// Mock commerce backend
// =============================================================================

/// Everything the mock backend knows, behind one lock.
///
/// Entities are stored as raw JSON values in the backend's own wire shapes
/// (camelCase fields, ids under `id` or `_id`), so seeding a test doubles
/// as exercising the storefront's tolerance for those shapes.
#[derive(Default)]
struct BackendState {
    products: Vec<Value>,
    cart_items: Vec<Value>,
    cart_total: i64,
    addresses: Vec<Value>,
    orders: Vec<Value>,
    wishlist: Vec<Value>,
    otp_required: bool,
    reject_login: bool,
    fail_cart_update: bool,
    verification_missing: Option<Vec<String>>,
    last_order_payload: Option<Value>,
    /// Every request received, as `"METHOD /path"`, in arrival order.
    requests: Vec<String>,
    next_id: u64,
}

type Shared = Arc<Mutex<BackendState>>;

fn locked(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().expect("Mock backend state lock poisoned")
}

/// An in-process stand-in for the commerce backend.
///
/// Seed it before driving the storefront, then assert on [`requests`],
/// [`order_payload`] and friends afterwards.
///
/// [`requests`]: MockCommerce::requests
/// [`order_payload`]: MockCommerce::order_payload
pub struct MockCommerce {
    state: Shared,
    addr: SocketAddr,
}

impl MockCommerce {
    /// Start the mock backend on an ephemeral port.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            next_id: 100,
            ..BackendState::default()
        }));
        let router = backend_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend listener");
        let addr = listener.local_addr().expect("Failed to read mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock backend server failed");
        });

        Self { state, addr }
    }

    /// Base URL the storefront should be configured with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    // -------------------------------------------------------------------------
    // Seeding
    // -------------------------------------------------------------------------

    pub fn seed_product(&self, id: &str, slug: &str, name: &str, price: i64) {
        self.push_product(id, slug, name, price, true);
    }

    pub fn seed_sold_out_product(&self, id: &str, slug: &str, name: &str, price: i64) {
        self.push_product(id, slug, name, price, false);
    }

    fn push_product(&self, id: &str, slug: &str, name: &str, price: i64, in_stock: bool) {
        locked(&self.state).products.push(json!({
            "id": id,
            "slug": slug,
            "name": name,
            "price": price,
            "images": [],
            "inStock": in_stock,
        }));
    }

    pub fn seed_cart_item(&self, id: &str, product_id: &str, name: &str, price: i64, quantity: u32) {
        locked(&self.state).cart_items.push(json!({
            "id": id,
            "product": {"_id": product_id, "name": name, "price": price},
            "quantity": quantity,
        }));
    }

    pub fn set_cart_total(&self, total: i64) {
        locked(&self.state).cart_total = total;
    }

    pub fn seed_address(&self, id: &str, full_name: &str, is_default: bool) {
        locked(&self.state).addresses.push(json!({
            "_id": id,
            "fullName": full_name,
            "phone": "9841000000",
            "province": "Bagmati Province",
            "district": "Kathmandu",
            "municipality": "Kathmandu",
            "wardNo": 7,
            "area": "Baneshwor",
            "isDefault": is_default,
        }));
    }

    pub fn seed_order(&self, id: &str, number: &str, status: &str, total: i64) {
        locked(&self.state).orders.push(json!({
            "id": id,
            "orderNumber": number,
            "status": status,
            "createdAt": "2025-11-02T09:30:00Z",
            "items": [
                {"product": {"_id": "prod-1", "name": "Wai Wai Noodles"}, "quantity": 2, "total": total},
            ],
            "address": {"_id": "addr-1", "fullName": "Asha Gurung", "area": "Baneshwor", "district": "Kathmandu"},
            "paymentMethod": "CASH_ON_DELIVERY",
            "subtotal": total,
            "deliveryCharge": 0,
            "discount": 0,
            "total": total,
        }));
    }

    // -------------------------------------------------------------------------
    // Behavior flags
    // -------------------------------------------------------------------------

    /// Make the next login answer with an OTP challenge instead of a token.
    pub fn set_otp_required(&self) {
        locked(&self.state).otp_required = true;
    }

    /// Reject all logins with 401.
    pub fn set_reject_login(&self) {
        locked(&self.state).reject_login = true;
    }

    /// Fail cart quantity updates without applying them.
    pub fn set_fail_cart_update(&self) {
        locked(&self.state).fail_cart_update = true;
    }

    /// Gate order placement behind account verification for `missing` fields.
    pub fn set_verification_missing(&self, missing: &[&str]) {
        locked(&self.state).verification_missing =
            Some(missing.iter().map(ToString::to_string).collect());
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// The body of the last `POST /orders`, if one arrived.
    #[must_use]
    pub fn order_payload(&self) -> Option<Value> {
        locked(&self.state).last_order_payload.clone()
    }

    /// The full request log, as `"METHOD /path"` lines in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        locked(&self.state).requests.clone()
    }

    /// Total number of requests the backend has seen.
    #[must_use]
    pub fn request_count(&self) -> usize {
        locked(&self.state).requests.len()
    }

    /// Number of logged requests starting with `line_prefix`
    /// (e.g. `"POST /orders"`).
    #[must_use]
    pub fn hits(&self, line_prefix: &str) -> usize {
        locked(&self.state)
            .requests
            .iter()
            .filter(|line| line.starts_with(line_prefix))
            .count()
    }
}

fn backend_router(state: Shared) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/auth/login", post(login))
        .route("/auth/login/verify-otp", post(verify_otp))
        .route("/auth/login/resend-otp", post(resend_otp))
        .route("/products", get(list_products))
        .route("/products/featured", get(featured_products))
        .route("/products/{slug}", get(product_by_slug))
        .route("/brands", get(list_brands))
        .route("/cart", get(get_cart))
        .route("/cart/items", post(add_cart_item))
        .route(
            "/cart/items/{id}",
            patch(update_cart_item).delete(remove_cart_item),
        )
        .route("/users/addresses", get(list_addresses).post(create_address))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/wishlist", get(list_wishlist).post(add_wishlist_item))
        .route("/wishlist/{id}", delete(remove_wishlist_item))
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state)
}

async fn record_request(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    locked(&state).requests.push(line);
    next.run(request).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        == Some(TEST_TOKEN)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthorized"}))).into_response()
}

fn session_payload(email: &str) -> Value {
    json!({
        "token": TEST_TOKEN,
        "user": {"_id": "user-1", "email": email, "name": "Asha"},
    })
}

// =============================================================================
// Auth endpoints
// =============================================================================

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let state = locked(&state);
    if state.reject_login {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response();
    }
    if state.otp_required {
        return Json(json!({"otpRequired": true})).into_response();
    }
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    Json(session_payload(email)).into_response()
}

async fn verify_otp(Json(body): Json<Value>) -> Response {
    let otp = body.get("otp").and_then(Value::as_str).unwrap_or_default();
    if otp == VALID_OTP {
        let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
        Json(session_payload(email)).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid or expired OTP"})),
        )
            .into_response()
    }
}

async fn resend_otp() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// Catalog endpoints
// =============================================================================

async fn list_products(State(state): State<Shared>) -> Json<Value> {
    Json(json!({"data": locked(&state).products.clone()}))
}

async fn featured_products(State(state): State<Shared>) -> Json<Value> {
    Json(json!({"data": locked(&state).products.clone()}))
}

async fn product_by_slug(State(state): State<Shared>, Path(slug): Path<String>) -> Response {
    let product = locked(&state)
        .products
        .iter()
        .find(|product| product.get("slug").and_then(Value::as_str) == Some(slug.as_str()))
        .cloned();
    match product {
        Some(product) => Json(product).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Product not found"})),
        )
            .into_response(),
    }
}

async fn list_brands() -> Json<Value> {
    Json(json!({"data": []}))
}

// =============================================================================
// Cart endpoints
// =============================================================================

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = locked(&state);
    Json(json!({"items": state.cart_items.clone(), "total": state.cart_total})).into_response()
}

async fn add_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = locked(&state);

    let product_id = body
        .get("productId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let quantity = body.get("quantity").and_then(Value::as_u64).unwrap_or(1);
    let product = state
        .products
        .iter()
        .find(|product| product.get("id").and_then(Value::as_str) == Some(product_id.as_str()))
        .cloned();
    let name = product
        .as_ref()
        .and_then(|product| product.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("Item")
        .to_string();
    let price = product
        .as_ref()
        .and_then(|product| product.get("price"))
        .and_then(Value::as_i64)
        .unwrap_or(0);

    state.next_id += 1;
    let line_id = format!("line-{}", state.next_id);
    state.cart_items.push(json!({
        "id": line_id,
        "product": {"_id": product_id, "name": name, "price": price},
        "quantity": quantity,
    }));
    state.cart_total += price.saturating_mul(i64::try_from(quantity).unwrap_or(0));

    StatusCode::CREATED.into_response()
}

async fn update_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = locked(&state);
    if state.fail_cart_update {
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({"message": "Cart service unavailable"})),
        )
            .into_response();
    }

    let quantity = body.get("quantity").and_then(Value::as_u64).unwrap_or(1);
    for item in &mut state.cart_items {
        if item.get("id").and_then(Value::as_str) == Some(id.as_str())
            && let Some(object) = item.as_object_mut()
        {
            object.insert("quantity".to_string(), json!(quantity));
        }
    }

    StatusCode::OK.into_response()
}

async fn remove_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    locked(&state)
        .cart_items
        .retain(|item| item.get("id").and_then(Value::as_str) != Some(id.as_str()));
    StatusCode::OK.into_response()
}

// =============================================================================
// Address endpoints
// =============================================================================

async fn list_addresses(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": locked(&state).addresses.clone()})).into_response()
}

async fn create_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = locked(&state);

    if body.get("isDefault").and_then(Value::as_bool) == Some(true) {
        for address in &mut state.addresses {
            if let Some(object) = address.as_object_mut() {
                object.insert("isDefault".to_string(), json!(false));
            }
        }
    }

    state.next_id += 1;
    let id = format!("addr-{}", state.next_id);
    let mut stored = body;
    if let Some(object) = stored.as_object_mut() {
        object.insert("_id".to_string(), json!(id));
    }
    state.addresses.push(stored);

    StatusCode::CREATED.into_response()
}

// =============================================================================
// Order endpoints
// =============================================================================

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    // Bare array, unlike the wrapped lists elsewhere.
    Json(Value::Array(locked(&state).orders.clone())).into_response()
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = locked(&state);

    if let Some(missing) = state.verification_missing.clone() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "message": "Insufficient verification to place orders",
                "missing": missing,
            })),
        )
            .into_response();
    }

    if body.get("clearCart").and_then(Value::as_bool) == Some(true) {
        state.cart_items.clear();
        state.cart_total = 0;
    }
    state.last_order_payload = Some(body);

    StatusCode::CREATED.into_response()
}

async fn get_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let order = locked(&state)
        .orders
        .iter()
        .find(|order| order.get("id").and_then(Value::as_str) == Some(id.as_str()))
        .cloned();
    match order {
        Some(order) => Json(order).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Order not found"})),
        )
            .into_response(),
    }
}

async fn cancel_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    for order in &mut locked(&state).orders {
        if order.get("id").and_then(Value::as_str) == Some(id.as_str())
            && let Some(object) = order.as_object_mut()
        {
            object.insert("status".to_string(), json!("CANCELLED"));
        }
    }
    StatusCode::OK.into_response()
}

// =============================================================================
// Wishlist endpoints
// =============================================================================

async fn list_wishlist(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": locked(&state).wishlist.clone()})).into_response()
}

async fn add_wishlist_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = locked(&state);

    let product_id = body
        .get("productId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let product = state
        .products
        .iter()
        .find(|product| product.get("id").and_then(Value::as_str) == Some(product_id.as_str()))
        .cloned()
        .unwrap_or_else(|| json!({"id": product_id, "name": "Item", "price": 0}));

    state.next_id += 1;
    let id = format!("wish-{}", state.next_id);
    state.wishlist.push(json!({"_id": id, "product": product}));

    StatusCode::CREATED.into_response()
}

async fn remove_wishlist_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    locked(&state)
        .wishlist
        .retain(|item| item.get("_id").and_then(Value::as_str) != Some(id.as_str()));
    StatusCode::OK.into_response()
}

// =============================================================================
// Test context
// =============================================================================

/// A running storefront wired to a [`MockCommerce`], plus a client that
/// keeps cookies like a browser.
pub struct TestContext {
    pub client: reqwest::Client,
    pub backend: MockCommerce,
    base_url: String,
}

impl TestContext {
    /// Start a mock backend and a storefront pointed at it.
    pub async fn spawn() -> Self {
        let backend = MockCommerce::spawn().await;

        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            // Plain HTTP keeps the session cookie non-Secure for tests.
            base_url: "http://127.0.0.1:0".to_string(),
            session_secret: SecretString::from(SESSION_SECRET),
            commerce: CommerceApiConfig {
                base_url: backend.base_url(),
                timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let router = app(AppState::new(config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront listener");
        let addr = listener.local_addr().expect("Failed to read storefront address");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Storefront server failed");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            backend,
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Log in as the test customer and follow the redirect home.
    pub async fn login(&self) {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("email", TEST_USER_EMAIL), ("password", TEST_PASSWORD)])
            .send()
            .await
            .expect("Login request failed");
        assert_eq!(response.url().path(), "/", "login should land on the home page");
    }
}

// =============================================================================
// HTML helpers
// =============================================================================

/// Pull the JSON cart snapshot out of the checkout form's hidden field.
#[must_use]
pub fn extract_hidden_snapshot(html: &str) -> String {
    let (_, rest) = html
        .split_once(r#"name="items" value=""#)
        .expect("Checkout page should carry the cart snapshot field");
    let (encoded, _) = rest
        .split_once('"')
        .expect("Snapshot attribute should be terminated");
    html_unescape(encoded)
}

/// Undo HTML entity escaping, covering both the named entities and the
/// decimal forms askama emits. The `&` entities are replaced last so
/// entities inside the original text survive.
#[must_use]
pub fn html_unescape(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&#60;", "<")
        .replace("&gt;", ">")
        .replace("&#62;", ">")
        .replace("&amp;", "&")
        .replace("&#38;", "&")
}

/// Assert that the first occurrence of `first` precedes the last occurrence
/// of `second` in the backend request log.
pub fn assert_called_before(requests: &[String], first: &str, second: &str) {
    let first_pos = requests.iter().position(|line| line == first);
    let second_pos = requests.iter().rposition(|line| line == second);
    match (first_pos, second_pos) {
        (Some(a), Some(b)) => {
            assert!(a < b, "expected {first} before {second} in the backend log: {requests:?}");
        }
        _ => panic!("expected both {first} and {second} in the backend log: {requests:?}"),
    }
}
