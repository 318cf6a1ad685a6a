//! Product catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::warn;

use crate::commerce::types::{Product, ProductRef};
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Product card data for listing grids.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_str().to_string(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            price: product.price.format(),
            image: product.images.first().cloned(),
            in_stock: product.in_stock,
        }
    }
}

impl From<&ProductRef> for ProductCardView {
    fn from(product: &ProductRef) -> Self {
        Self {
            id: product.id.as_str().to_string(),
            slug: product.id.as_str().to_string(),
            name: product.name.clone(),
            price: product.price.format(),
            image: product.image.clone(),
            in_stock: true,
        }
    }
}

/// Brand filter entry for the listing sidebar.
#[derive(Clone)]
pub struct BrandView {
    pub slug: String,
    pub name: String,
    pub active: bool,
}

/// Catalog filter query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub brand: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
    pub brands: Vec<BrandView>,
    pub search: String,
    pub logged_in: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub images: Vec<String>,
    pub brand: Option<String>,
    pub in_stock: bool,
    pub slug: String,
    pub is_wishlisted: bool,
    pub logged_in: bool,
}

/// Display the product listing, optionally filtered by search or brand.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> Result<ProductsIndexTemplate, AppError> {
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    let brand = query.brand.as_deref().filter(|b| !b.trim().is_empty());

    let (products, brands) = tokio::join!(
        state.commerce().get_products(search, brand),
        state.commerce().get_brands(),
    );
    let products = products?;

    // The brand sidebar is decoration; the listing renders without it.
    let brands = brands.unwrap_or_else(|error| {
        warn!(error = %error, "Failed to load brands for listing sidebar");
        Vec::new()
    });

    Ok(ProductsIndexTemplate {
        products: products.iter().map(ProductCardView::from).collect(),
        brands: brands
            .iter()
            .map(|entry| BrandView {
                slug: entry.slug.clone(),
                name: entry.name.clone(),
                active: brand == Some(entry.slug.as_str()),
            })
            .collect(),
        search: search.unwrap_or_default().to_string(),
        logged_in: auth.is_some(),
    })
}

/// Display a product detail page.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<ProductShowTemplate, AppError> {
    let product = state.commerce().get_product_by_slug(&slug).await?;

    let is_wishlisted = match &auth {
        Some(auth) => match state.commerce().get_wishlist(&auth.token).await {
            Ok(items) => items.iter().any(|item| item.product.id == product.id),
            Err(error) => {
                warn!(error = %error, "Failed to load wishlist state for product page");
                false
            }
        },
        None => false,
    };

    Ok(ProductShowTemplate {
        id: product.id.as_str().to_string(),
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price.format(),
        images: product.images.clone(),
        brand: product.brand.as_ref().map(|brand| brand.name.clone()),
        in_stock: product.in_stock,
        slug: product.slug,
        is_wishlisted,
        logged_in: auth.is_some(),
    })
}
