//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use pasal_core::{ProductId, WishlistItemId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// One wishlist row.
#[derive(Clone)]
pub struct WishlistRowView {
    pub item_id: String,
    pub product: ProductCardView,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/index.html")]
pub struct WishlistTemplate {
    pub items: Vec<WishlistRowView>,
    pub logged_in: bool,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: String,
    /// Slug of the product page to return to.
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub item_id: String,
}

/// Display the wishlist.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<WishlistTemplate, AppError> {
    let items = state.commerce().get_wishlist(&auth.token).await?;

    Ok(WishlistTemplate {
        items: items
            .iter()
            .map(|item| WishlistRowView {
                item_id: item.id.as_str().to_string(),
                product: ProductCardView::from(&item.product),
            })
            .collect(),
        logged_in: true,
    })
}

/// Toggle a product on the wishlist from its product page.
///
/// The current state decides the direction: listed products are removed,
/// unlisted ones added. Either way the product page re-fetches on the
/// redirect and shows the new state.
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect, AppError> {
    let product_id = ProductId::new(form.product_id);
    let items = state.commerce().get_wishlist(&auth.token).await?;

    match items.iter().find(|item| item.product.id == product_id) {
        Some(existing) => {
            state
                .commerce()
                .remove_from_wishlist(&auth.token, &existing.id)
                .await?;
        }
        None => {
            state
                .commerce()
                .add_to_wishlist(&auth.token, &product_id)
                .await?;
        }
    }

    Ok(Redirect::to(&format!("/products/{}", form.slug)))
}

/// Remove an entry from the wishlist page.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<RemoveForm>,
) -> Result<Redirect, AppError> {
    let item_id = WishlistItemId::new(form.item_id);
    state
        .commerce()
        .remove_from_wishlist(&auth.token, &item_id)
        .await?;

    Ok(Redirect::to("/wishlist"))
}
