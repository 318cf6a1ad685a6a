//! Account pages: order history, cancellation, addresses, and the wishlist.

use reqwest::StatusCode;

use pasal_integration_tests::TestContext;

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_order_history_lists_orders() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_order("order-1", "1042", "PENDING", 1500);
    ctx.login().await;

    let response = ctx
        .client
        .get(ctx.url("/account/orders"))
        .send()
        .await
        .expect("Orders page request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Order #1042"));
    assert!(body.contains("PENDING"));
    assert!(body.contains("NPR 1,500"));
    assert!(body.contains("Nov 2, 2025"));
}

#[tokio::test]
async fn test_cancel_pending_order() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_order("order-1", "1042", "PENDING", 1500);
    ctx.login().await;

    let detail = ctx
        .client
        .get(ctx.url("/account/orders/order-1"))
        .send()
        .await
        .expect("Order detail request failed")
        .text()
        .await
        .expect("Failed to read order detail");
    assert!(detail.contains("Status:</span> PENDING"));
    assert!(detail.contains("Cancel Order"));
    assert!(detail.contains("Wai Wai Noodles"));
    assert!(detail.contains("Cash on Delivery"));

    // Cancel, follow the redirect back to the detail page.
    let response = ctx
        .client
        .post(ctx.url("/account/orders/order-1/cancel"))
        .send()
        .await
        .expect("Cancel request failed");
    assert_eq!(response.url().path(), "/account/orders/order-1");

    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Status:</span> CANCELLED"));
    assert!(!body.contains("Cancel Order"), "a cancelled order offers no cancel");
}

#[tokio::test]
async fn test_delivered_order_not_cancellable() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_order("order-2", "1043", "DELIVERED", 900);
    ctx.login().await;

    let body = ctx
        .client
        .get(ctx.url("/account/orders/order-2"))
        .send()
        .await
        .expect("Order detail request failed")
        .text()
        .await
        .expect("Failed to read order detail");

    assert!(body.contains("Status:</span> DELIVERED"));
    assert!(!body.contains("Cancel Order"));
}

// ============================================================================
// Addresses
// ============================================================================

#[tokio::test]
async fn test_create_address() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let response = ctx
        .client
        .post(ctx.url("/account/addresses"))
        .form(&[
            ("full_name", "Sita Sharma"),
            ("phone", "9860000000"),
            ("province", "Gandaki Province"),
            ("district", "Kaski"),
            ("municipality", "Pokhara"),
            ("ward_no", "5"),
            ("area", "Lakeside"),
            ("is_default", "on"),
        ])
        .send()
        .await
        .expect("Address create request failed");

    assert_eq!(response.url().path(), "/account/addresses");
    assert_eq!(ctx.backend.hits("POST /users/addresses"), 1);

    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Sita Sharma"));
    assert!(body.contains("(Default)"));
    assert!(body.contains("Lakeside, Pokhara - 5, Kaski, Gandaki Province"));
}

// ============================================================================
// Wishlist
// ============================================================================

#[tokio::test]
async fn test_wishlist_toggle_round_trip() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_product("prod-9", "himalayan-honey", "Himalayan Honey", 850);
    ctx.login().await;

    // First toggle adds, and lands back on the product page.
    let response = ctx
        .client
        .post(ctx.url("/wishlist/toggle"))
        .form(&[("product_id", "prod-9"), ("slug", "himalayan-honey")])
        .send()
        .await
        .expect("Wishlist toggle request failed");
    assert_eq!(response.url().path(), "/products/himalayan-honey");
    assert_eq!(ctx.backend.hits("POST /wishlist"), 1);

    let body = ctx
        .client
        .get(ctx.url("/wishlist"))
        .send()
        .await
        .expect("Wishlist page request failed")
        .text()
        .await
        .expect("Failed to read wishlist page");
    assert!(body.contains("Himalayan Honey"));

    // Second toggle removes.
    let response = ctx
        .client
        .post(ctx.url("/wishlist/toggle"))
        .form(&[("product_id", "prod-9"), ("slug", "himalayan-honey")])
        .send()
        .await
        .expect("Wishlist toggle request failed");
    assert_eq!(response.url().path(), "/products/himalayan-honey");
    assert_eq!(ctx.backend.hits("DELETE /wishlist/"), 1);

    let body = ctx
        .client
        .get(ctx.url("/wishlist"))
        .send()
        .await
        .expect("Wishlist page request failed")
        .text()
        .await
        .expect("Failed to read wishlist page");
    assert!(body.contains("Your wishlist is empty."));
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::spawn().await;

    let response = ctx
        .client
        .get(ctx.url("/health"))
        .send()
        .await
        .expect("Health request failed");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("Failed to read health body"), "ok");

    // Readiness probes the commerce backend.
    let response = ctx
        .client
        .get(ctx.url("/health/ready"))
        .send()
        .await
        .expect("Readiness request failed");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ctx.backend.hits("GET /health"), 1);
}
