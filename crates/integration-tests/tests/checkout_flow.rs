//! Checkout flow: the submitted snapshot becomes the order draft, address
//! fallback picks the default, and precondition failures never reach the
//! backend.

#![allow(clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::Value;

use pasal_integration_tests::{TestContext, extract_hidden_snapshot};

/// Load the checkout page and pull the cart snapshot out of its form.
async fn checkout_snapshot(ctx: &TestContext) -> String {
    let page = ctx
        .client
        .get(ctx.url("/checkout"))
        .send()
        .await
        .expect("Checkout page request failed");
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().await.expect("Failed to read checkout page");
    extract_hidden_snapshot(&html)
}

// ============================================================================
// Order placement
// ============================================================================

#[tokio::test]
async fn test_place_order_uses_default_address_and_clears_cart() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_address("addr-1", "Asha Gurung", false);
    ctx.backend.seed_address("addr-2", "Asha Gurung (Home)", true);
    ctx.backend.seed_cart_item("line-1", "prod-1", "Wai Wai Noodles", 25, 2);
    ctx.backend.seed_cart_item("line-2", "prod-2", "Ilam Green Tea", 450, 1);
    ctx.backend.set_cart_total(500);
    ctx.login().await;

    let page = ctx
        .client
        .get(ctx.url("/checkout"))
        .send()
        .await
        .expect("Checkout page request failed");
    let html = page.text().await.expect("Failed to read checkout page");
    assert!(html.contains("Complete your order"));
    // The default address and cash-on-delivery arrive pre-selected.
    assert!(html.contains(r#"value="addr-2" class="mt-1" checked"#));
    assert!(html.contains(r#"value="CASH_ON_DELIVERY" class="mt-1" checked"#));
    let snapshot = extract_hidden_snapshot(&html);

    // Submit without picking an address: the default must be used.
    let response = ctx
        .client
        .post(ctx.url("/checkout/place"))
        .form(&[
            ("payment_method", "ESEWA"),
            ("note", "  Ring the bell twice  "),
            ("items", snapshot.as_str()),
        ])
        .send()
        .await
        .expect("Place order request failed");

    assert_eq!(response.url().path(), "/checkout/confirmation");
    let body = response.text().await.expect("Failed to read confirmation page");
    assert!(body.contains("Your order has been successfully confirmed."));

    let payload = ctx.backend.order_payload().expect("order should reach the backend");
    assert_eq!(payload["addressId"], "addr-2");
    assert_eq!(payload["paymentMethod"], "ESEWA");
    assert_eq!(payload["note"], "Ring the bell twice");
    assert_eq!(payload["clearCart"], true);
    assert_eq!(payload["items"][0]["productId"], "prod-1");
    assert_eq!(payload["items"][0]["quantity"], 2);
    assert_eq!(payload["items"][1]["productId"], "prod-2");
    assert_eq!(payload["items"][1]["quantity"], 1);
    assert_eq!(ctx.backend.hits("POST /orders"), 1);

    // The same transaction cleared the cart.
    let cart = ctx
        .client
        .get(ctx.url("/cart"))
        .send()
        .await
        .expect("Cart page request failed")
        .text()
        .await
        .expect("Failed to read cart page");
    assert!(cart.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_explicit_address_overrides_default() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_address("addr-1", "Asha Gurung", true);
    ctx.backend.seed_address("addr-2", "Asha Gurung (Office)", false);
    ctx.backend.seed_cart_item("line-1", "prod-1", "Wai Wai Noodles", 25, 1);
    ctx.backend.set_cart_total(25);
    ctx.login().await;

    let snapshot = checkout_snapshot(&ctx).await;
    let response = ctx
        .client
        .post(ctx.url("/checkout/place"))
        .form(&[
            ("address_id", "addr-2"),
            ("payment_method", "CASH_ON_DELIVERY"),
            ("items", snapshot.as_str()),
        ])
        .send()
        .await
        .expect("Place order request failed");

    assert_eq!(response.url().path(), "/checkout/confirmation");
    let payload = ctx.backend.order_payload().expect("order should reach the backend");
    assert_eq!(payload["addressId"], "addr-2");
}

// ============================================================================
// Local preconditions
// ============================================================================

#[tokio::test]
async fn test_empty_cart_submission_makes_no_backend_calls() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_address("addr-1", "Asha Gurung", true);
    ctx.login().await;

    let before = ctx.backend.request_count();
    let response = ctx
        .client
        .post(ctx.url("/checkout/place"))
        .form(&[
            ("payment_method", "CASH_ON_DELIVERY"),
            ("items", r#"{"items": [], "total": "0"}"#),
        ])
        .send()
        .await
        .expect("Place order request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/checkout/place", "no redirect on rejection");
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Your cart is empty"));

    assert_eq!(ctx.backend.request_count(), before, "rejection must be fully local");
    assert_eq!(ctx.backend.hits("POST /orders"), 0);
}

#[tokio::test]
async fn test_missing_address_submission_makes_no_backend_calls() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let snapshot = concat!(
        r#"{"items": [{"product_id": "prod-1", "name": "Wai Wai Noodles", "#,
        r#""price": "25", "quantity": 1}], "total": "25"}"#,
    );
    let before = ctx.backend.request_count();
    let response = ctx
        .client
        .post(ctx.url("/checkout/place"))
        .form(&[("payment_method", "CASH_ON_DELIVERY"), ("items", snapshot)])
        .send()
        .await
        .expect("Place order request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Please select a delivery address"));
    assert!(body.contains("No delivery address found."));

    assert_eq!(ctx.backend.request_count(), before, "rejection must be fully local");
    assert_eq!(ctx.backend.hits("POST /orders"), 0);
}

// ============================================================================
// Verification gate
// ============================================================================

#[tokio::test]
async fn test_verification_gate_names_missing_fields() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_address("addr-1", "Asha Gurung", true);
    ctx.backend.seed_cart_item("line-1", "prod-1", "Wai Wai Noodles", 25, 1);
    ctx.backend.set_cart_total(25);
    ctx.login().await;

    let snapshot = checkout_snapshot(&ctx).await;
    ctx.backend.set_verification_missing(&["email", "phone"]);

    let response = ctx
        .client
        .post(ctx.url("/checkout/place"))
        .form(&[("payment_method", "CASH_ON_DELIVERY"), ("items", snapshot.as_str())])
        .send()
        .await
        .expect("Place order request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/checkout/place");
    let body = response.text().await.expect("Failed to read response body");
    // "&" renders entity-escaped.
    assert!(body.contains("Verify email &amp; phone to place orders."));

    // The submission did reach the backend and was refused there.
    assert_eq!(ctx.backend.hits("POST /orders"), 1);
    assert!(ctx.backend.order_payload().is_none(), "no order may be recorded");
}

#[tokio::test]
async fn test_verification_gate_single_field() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_address("addr-1", "Asha Gurung", true);
    ctx.backend.seed_cart_item("line-1", "prod-1", "Wai Wai Noodles", 25, 1);
    ctx.backend.set_cart_total(25);
    ctx.login().await;

    let snapshot = checkout_snapshot(&ctx).await;
    ctx.backend.set_verification_missing(&["phone"]);

    let response = ctx
        .client
        .post(ctx.url("/checkout/place"))
        .form(&[("payment_method", "CASH_ON_DELIVERY"), ("items", snapshot.as_str())])
        .send()
        .await
        .expect("Place order request failed");

    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Verify phone to place orders."));
}

// ============================================================================
// Page states
// ============================================================================

#[tokio::test]
async fn test_checkout_page_shows_empty_state() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_address("addr-1", "Asha Gurung", true);
    ctx.login().await;

    let response = ctx
        .client
        .get(ctx.url("/checkout"))
        .send()
        .await
        .expect("Checkout page request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Your cart is empty."));
    assert!(body.contains("Continue Shopping"));
}
