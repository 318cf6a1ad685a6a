//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::{instrument, warn};

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Number of featured products on the home page.
const FEATURED_LIMIT: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductCardView>,
    pub logged_in: bool,
}

/// Display the home page.
///
/// The home page must render even when the backend is down, so a failed
/// featured-products fetch degrades to an empty section.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, OptionalAuth(auth): OptionalAuth) -> HomeTemplate {
    let featured = match state.commerce().get_featured_products(FEATURED_LIMIT).await {
        Ok(products) => products.iter().map(ProductCardView::from).collect(),
        Err(error) => {
            warn!(error = %error, "Failed to load featured products");
            Vec::new()
        }
    };

    HomeTemplate {
        featured,
        logged_in: auth.is_some(),
    }
}
