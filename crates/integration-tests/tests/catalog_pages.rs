//! Public catalog pages: home, product listing, and product detail.

use reqwest::StatusCode;

use pasal_integration_tests::TestContext;

#[tokio::test]
async fn test_home_shows_featured_products() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_product("prod-1", "wai-wai", "Wai Wai Noodles", 25);

    let response = ctx
        .client
        .get(ctx.url("/"))
        .send()
        .await
        .expect("Home page request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("one pasal."));
    assert!(body.contains("Wai Wai Noodles"));
    assert!(body.contains("NPR 25"));
}

#[tokio::test]
async fn test_products_index_lists_catalog() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_product("prod-1", "wai-wai", "Wai Wai Noodles", 25);
    ctx.backend.seed_sold_out_product("prod-2", "ilam-tea", "Ilam Green Tea", 450);

    let response = ctx
        .client
        .get(ctx.url("/products"))
        .send()
        .await
        .expect("Products page request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Wai Wai Noodles"));
    assert!(body.contains("Ilam Green Tea"));
    assert!(body.contains("All brands"));
    // The sold-out product carries its badge.
    assert!(body.contains("Out of stock"));
}

#[tokio::test]
async fn test_product_detail_page() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_product("prod-9", "himalayan-honey", "Himalayan Honey", 850);

    let response = ctx
        .client
        .get(ctx.url("/products/himalayan-honey"))
        .send()
        .await
        .expect("Product page request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains("Himalayan Honey"));
    assert!(body.contains("NPR 850"));
    assert!(body.contains("Add to Cart"));
    assert!(body.contains(r#"name="product_id" value="prod-9""#));
}

#[tokio::test]
async fn test_sold_out_product_disables_add() {
    let ctx = TestContext::spawn().await;
    ctx.backend.seed_sold_out_product("prod-2", "ilam-tea", "Ilam Green Tea", 450);

    let body = ctx
        .client
        .get(ctx.url("/products/ilam-tea"))
        .send()
        .await
        .expect("Product page request failed")
        .text()
        .await
        .expect("Failed to read response body");

    assert!(body.contains("Out of stock"));
    assert!(body.contains("disabled"));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let ctx = TestContext::spawn().await;

    let response = ctx
        .client
        .get(ctx.url("/products/does-not-exist"))
        .send()
        .await
        .expect("Product page request failed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
