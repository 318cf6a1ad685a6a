//! Cart flow: pessimistic mutations, local rejections, and the header badge.
//!
//! Every cart assertion here leans on the mock backend's request log: a
//! mutation must be followed by a re-fetch (the storefront never edits cart
//! state locally), and a locally-rejected submission must leave the log
//! untouched.

use reqwest::StatusCode;

use pasal_integration_tests::{TestContext, assert_called_before};

/// The quantity markup rendered for a cart line.
fn quantity_span(quantity: u32) -> String {
    format!(r#"<span class="text-sm text-gray-700">{quantity}</span>"#)
}

// ============================================================================
// Add to cart
// ============================================================================

#[tokio::test]
async fn test_add_to_cart_refetches_and_fires_trigger() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_product("prod-1", "wai-wai", "Wai Wai Noodles", 25);
    ctx.login().await;

    let response = ctx
        .client
        .post(ctx.url("/cart/add"))
        .form(&[("product_id", "prod-1"), ("quantity", "2")])
        .send()
        .await
        .expect("Add to cart request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("hx-trigger").and_then(|value| value.to_str().ok()),
        Some("cart-updated"),
        "a successful mutation should fire the badge refresh event"
    );

    // The write must land before the authoritative re-read.
    let requests = ctx.backend.requests();
    assert_called_before(&requests, "POST /cart/items", "GET /cart");

    // The response body is the refreshed badge fragment.
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("cart-count"));
}

#[tokio::test]
async fn test_add_below_one_rejected_locally() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_product("prod-1", "wai-wai", "Wai Wai Noodles", 25);
    ctx.login().await;

    let before = ctx.backend.request_count();
    let response = ctx
        .client
        .post(ctx.url("/cart/add"))
        .form(&[("product_id", "prod-1"), ("quantity", "0")])
        .send()
        .await
        .expect("Add to cart request failed");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(ctx.backend.request_count(), before, "no backend call may happen");
    assert_eq!(ctx.backend.hits("POST /cart/items"), 0);
}

// ============================================================================
// Quantity updates
// ============================================================================

#[tokio::test]
async fn test_update_quantity_refetches_server_state() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_cart_item("line-1", "prod-1", "Wai Wai Noodles", 25, 2);
    ctx.backend.set_cart_total(50);
    ctx.login().await;

    let response = ctx
        .client
        .post(ctx.url("/cart/update"))
        .form(&[("item_id", "line-1"), ("quantity", "3")])
        .send()
        .await
        .expect("Cart update request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("hx-trigger"));

    let requests = ctx.backend.requests();
    assert_called_before(&requests, "PATCH /cart/items/line-1", "GET /cart");

    // The fragment shows what the backend now holds, not the posted value.
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains(&quantity_span(3)));
}

#[tokio::test]
async fn test_update_below_one_makes_no_backend_call() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_cart_item("line-1", "prod-1", "Wai Wai Noodles", 25, 1);
    ctx.login().await;

    let before = ctx.backend.request_count();
    let response = ctx
        .client
        .post(ctx.url("/cart/update"))
        .form(&[("item_id", "line-1"), ("quantity", "0")])
        .send()
        .await
        .expect("Cart update request failed");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(ctx.backend.request_count(), before);
    assert_eq!(ctx.backend.hits("PATCH /cart/items"), 0);
}

#[tokio::test]
async fn test_failed_update_shows_server_state_with_error() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_cart_item("line-1", "prod-1", "Wai Wai Noodles", 25, 2);
    ctx.backend.set_cart_total(50);
    ctx.backend.set_fail_cart_update();
    ctx.login().await;

    let response = ctx
        .client
        .post(ctx.url("/cart/update"))
        .form(&[("item_id", "line-1"), ("quantity", "5")])
        .send()
        .await
        .expect("Cart update request failed");

    assert_eq!(response.status(), StatusCode::OK);
    // No trigger: the badge must not refresh off a failed mutation.
    assert!(!response.headers().contains_key("hx-trigger"));

    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Failed to update quantity"));
    // The old quantity is still what the server holds, and what renders.
    assert!(body.contains(&quantity_span(2)));
}

// ============================================================================
// Removal
// ============================================================================

#[tokio::test]
async fn test_remove_item_refetches() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_cart_item("line-1", "prod-1", "Wai Wai Noodles", 25, 2);
    ctx.backend.seed_cart_item("line-2", "prod-2", "Ilam Green Tea", 450, 1);
    ctx.backend.set_cart_total(500);
    ctx.login().await;

    let response = ctx
        .client
        .post(ctx.url("/cart/remove"))
        .form(&[("item_id", "line-1")])
        .send()
        .await
        .expect("Cart remove request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("hx-trigger"));

    let requests = ctx.backend.requests();
    assert_called_before(&requests, "DELETE /cart/items/line-1", "GET /cart");

    let body = response.text().await.expect("Failed to read response body");
    assert!(!body.contains("Wai Wai Noodles"));
    assert!(body.contains("Ilam Green Tea"));
}

// ============================================================================
// Badge & access
// ============================================================================

#[tokio::test]
async fn test_cart_count_zero_for_anonymous() {
    let ctx = TestContext::spawn().await;

    let response = ctx
        .client
        .get(ctx.url("/cart/count"))
        .send()
        .await
        .expect("Cart count request failed");

    assert_eq!(response.status(), StatusCode::OK);
    // Anonymous visitors never cause a backend call.
    assert_eq!(ctx.backend.request_count(), 0);

    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("cart-count"));
    assert!(!body.contains("bg-emerald-600"), "no badge pill for an empty count");
}

#[tokio::test]
async fn test_cart_page_redirects_anonymous_to_login() {
    let ctx = TestContext::spawn().await;

    let response = ctx
        .client
        .get(ctx.url("/cart"))
        .send()
        .await
        .expect("Cart page request failed");

    assert_eq!(response.url().path(), "/auth/login");
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Welcome back"));
}
