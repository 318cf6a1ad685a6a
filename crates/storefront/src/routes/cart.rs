//! Cart route handlers.
//!
//! Cart state lives on the commerce backend; the storefront holds none.
//! Every mutation is pessimistic: send the change, then re-fetch the cart
//! and swap the refreshed fragment into the page. HTMX drives the swaps,
//! and each successful mutation fires a `cart-updated` event so the header
//! badge refreshes itself.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse, Response};
use serde::Deserialize;
use tracing::{error, warn};

use pasal_core::{CartItemId, ProductId};

use crate::commerce::types::Cart;
use crate::error::{self, AppError};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::state::AppState;

/// HTMX event fired whenever the cart changes.
const CART_UPDATED_EVENT: &str = "cart-updated";

/// Cart line display data.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub price: String,
    pub quantity: u32,
    /// Quantity cannot go below one; the minus control renders disabled.
    pub at_min: bool,
}

/// Cart display data.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub count: usize,
}

impl CartView {
    fn from_cart(cart: &Cart) -> Self {
        Self {
            items: cart
                .items
                .iter()
                .map(|item| CartItemView {
                    id: item.id.as_str().to_string(),
                    name: item.product.name.clone(),
                    image: item.product.image.clone(),
                    price: item.product.price.format(),
                    quantity: item.quantity,
                    at_min: item.quantity <= 1,
                })
                .collect(),
            subtotal: cart.total.format(),
            count: cart.item_count(),
        }
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartPageTemplate {
    pub cart: CartView,
    pub error: Option<String>,
    pub logged_in: bool,
}

/// Cart lines fragment (HTMX swap target).
#[derive(Template, WebTemplate)]
#[template(path = "cart/_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Header badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "cart/_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveCartForm {
    pub item_id: String,
}

/// Display the cart page.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> CartPageTemplate {
    match state.commerce().get_cart(&auth.token).await {
        Ok(cart) => CartPageTemplate {
            cart: CartView::from_cart(&cart),
            error: None,
            logged_in: true,
        },
        Err(err) => {
            error!(error = %err, "Failed to load cart");
            CartPageTemplate {
                cart: CartView::from_cart(&Cart::default()),
                error: Some("Failed to load your cart. Please try again.".to_string()),
                logged_in: true,
            }
        }
    }
}

/// Add a product to the cart and return the refreshed badge fragment.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    if form.quantity < 1 {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let Ok(quantity) = u32::try_from(form.quantity) else {
        return Err(AppError::BadRequest("Quantity out of range".to_string()));
    };

    let product_id = ProductId::new(form.product_id);
    state
        .commerce()
        .add_to_cart(&auth.token, &product_id, quantity)
        .await?;
    error::add_breadcrumb("cart", "Added product to cart");

    let cart = state.commerce().get_cart(&auth.token).await?;
    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response())
}

/// Change a line's quantity and return the refreshed cart fragment.
///
/// Quantities below one are refused locally: no backend call happens and
/// the 204 leaves the page untouched.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response, AppError> {
    if form.quantity < 1 {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let Ok(quantity) = u32::try_from(form.quantity) else {
        return Err(AppError::BadRequest("Quantity out of range".to_string()));
    };

    let item_id = CartItemId::new(form.item_id);
    match state
        .commerce()
        .update_cart_item(&auth.token, &item_id, quantity)
        .await
    {
        Ok(()) => refreshed_fragment(&state, &auth.token).await,
        Err(err) => {
            error!(error = %err, "Failed to update cart quantity");
            failed_mutation_fragment(&state, &auth.token, "Failed to update quantity").await
        }
    }
}

/// Remove a line and return the refreshed cart fragment.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<RemoveCartForm>,
) -> Result<Response, AppError> {
    let item_id = CartItemId::new(form.item_id);
    match state.commerce().remove_cart_item(&auth.token, &item_id).await {
        Ok(()) => refreshed_fragment(&state, &auth.token).await,
        Err(err) => {
            error!(error = %err, "Failed to remove cart item");
            failed_mutation_fragment(&state, &auth.token, "Failed to remove item").await
        }
    }
}

/// Render the header badge count.
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> CartCountTemplate {
    let count = match auth {
        Some(auth) => match state.commerce().get_cart(&auth.token).await {
            Ok(cart) => cart.item_count(),
            Err(err) => {
                warn!(error = %err, "Failed to load cart count");
                0
            }
        },
        None => 0,
    };

    CartCountTemplate { count }
}

/// Re-fetch the cart after a successful mutation and render the fragment.
async fn refreshed_fragment(state: &AppState, token: &str) -> Result<Response, AppError> {
    let cart = state.commerce().get_cart(token).await?;
    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartItemsTemplate {
            cart: CartView::from_cart(&cart),
            error: None,
        },
    )
        .into_response())
}

/// After a failed mutation, re-render current server state with an error
/// banner. If even the re-fetch fails, bubble the error so the page keeps
/// its previous state instead of swapping in something wrong.
async fn failed_mutation_fragment(
    state: &AppState,
    token: &str,
    message: &str,
) -> Result<Response, AppError> {
    let cart = state.commerce().get_cart(token).await?;
    Ok(CartItemsTemplate {
        cart: CartView::from_cart(&cart),
        error: Some(message.to_string()),
    }
    .into_response())
}
