//! Order history route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use tracing::error;

use pasal_core::OrderId;

use crate::commerce::types::Order;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// One row in the order history table.
#[derive(Clone)]
pub struct OrderRowView {
    pub id: String,
    pub order_number: String,
    pub placed_at: String,
    pub status: &'static str,
    pub item_count: usize,
    pub total: String,
}

/// One line on the order detail page.
#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub total: String,
}

/// Full order detail display data.
#[derive(Clone)]
pub struct OrderDetailView {
    pub id: String,
    pub order_number: String,
    pub placed_at: String,
    pub status: &'static str,
    pub cancellable: bool,
    pub items: Vec<OrderLineView>,
    pub recipient: Option<String>,
    pub delivery_area: Option<String>,
    pub payment_method: Option<&'static str>,
    pub subtotal: String,
    pub delivery_charge: String,
    pub discount: String,
    pub has_discount: bool,
    pub total: String,
}

impl OrderDetailView {
    fn from_order(order: &Order) -> Self {
        Self {
            id: order.id.as_str().to_string(),
            order_number: order.order_number.clone(),
            placed_at: format_date(order.placed_at),
            status: order.status.as_str(),
            cancellable: order.status.is_cancellable(),
            items: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    total: item.total.format(),
                })
                .collect(),
            recipient: order
                .address
                .as_ref()
                .map(|address| address.full_name.clone()),
            delivery_area: order
                .address
                .as_ref()
                .map(|address| format!("{}, {}", address.area, address.district)),
            payment_method: order.payment_method.map(pasal_core::PaymentMethod::label),
            subtotal: order.subtotal.format(),
            delivery_charge: order.delivery_charge.format(),
            discount: order.discount.format(),
            has_discount: !order.discount.is_zero(),
            total: order.total.format(),
        }
    }
}

fn format_date(placed_at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    placed_at
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub orders: Vec<OrderRowView>,
    pub logged_in: bool,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub order: OrderDetailView,
    pub error: Option<String>,
    pub logged_in: bool,
}

/// Display the order history.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<OrdersIndexTemplate, AppError> {
    let orders = state.commerce().get_orders(&auth.token).await?;

    Ok(OrdersIndexTemplate {
        orders: orders
            .iter()
            .map(|order| OrderRowView {
                id: order.id.as_str().to_string(),
                order_number: order.order_number.clone(),
                placed_at: format_date(order.placed_at),
                status: order.status.as_str(),
                item_count: order.items.len(),
                total: order.total.format(),
            })
            .collect(),
        logged_in: true,
    })
}

/// Display one order.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<String>,
) -> Result<OrderShowTemplate, AppError> {
    let order_id = OrderId::new(id);
    let order = state.commerce().get_order(&auth.token, &order_id).await?;

    Ok(OrderShowTemplate {
        order: OrderDetailView::from_order(&order),
        error: None,
        logged_in: true,
    })
}

/// Cancel an order, then show its refreshed detail page.
///
/// Cancellation is a backend decision; on refusal the detail page renders
/// with the order untouched and an error banner.
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let order_id = OrderId::new(id);

    match state.commerce().cancel_order(&auth.token, &order_id).await {
        Ok(()) => Ok(Redirect::to(&format!("/account/orders/{order_id}")).into_response()),
        Err(err) => {
            error!(error = %err, "Failed to cancel order");
            let order = state.commerce().get_order(&auth.token, &order_id).await?;
            Ok(OrderShowTemplate {
                order: OrderDetailView::from_order(&order),
                error: Some("Failed to cancel order".to_string()),
                logged_in: true,
            }
            .into_response())
        }
    }
}
