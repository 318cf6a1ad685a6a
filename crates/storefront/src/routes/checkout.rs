//! Checkout route handlers.
//!
//! The checkout page renders the cart into the form as a JSON snapshot;
//! submission posts that snapshot back and the order draft is assembled
//! from it, so the customer orders exactly what they saw. Precondition
//! failures (no address, empty cart) are caught before any backend call
//! and re-render from the submitted state alone.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::warn;

use pasal_core::{AddressId, PaymentMethod};

use crate::commerce::CommerceError;
use crate::commerce::types::Address;
use crate::error::{self, AppError};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::checkout::{self, CartSnapshot};
use crate::state::AppState;

/// One summary line on the checkout page.
#[derive(Clone)]
pub struct SummaryLineView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
}

/// One address option in the delivery address picker.
#[derive(Clone)]
pub struct AddressOptionView {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub summary: String,
    pub is_default: bool,
    pub checked: bool,
}

/// One payment method option.
#[derive(Clone)]
pub struct PaymentOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub checked: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutPageTemplate {
    pub items: Vec<SummaryLineView>,
    pub subtotal: String,
    pub snapshot_json: String,
    pub addresses: Vec<AddressOptionView>,
    pub payment_options: Vec<PaymentOptionView>,
    pub note: String,
    pub error: Option<String>,
    pub trust_message: Option<String>,
    pub logged_in: bool,
}

impl CheckoutPageTemplate {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_addresses(&self) -> bool {
        !self.addresses.is_empty()
    }
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub logged_in: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub address_id: Option<String>,
    pub payment_method: String,
    pub note: Option<String>,
    /// The [`CartSnapshot`] the page rendered, JSON-encoded.
    #[serde(default)]
    pub items: String,
}

/// Display the checkout page.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<CheckoutPageTemplate, AppError> {
    let (cart, addresses) = tokio::join!(
        state.commerce().get_cart(&auth.token),
        state.commerce().get_addresses(&auth.token),
    );
    let cart = cart?;
    let addresses = addresses?;

    let snapshot = CartSnapshot::from_cart(&cart);
    checkout_page(
        &snapshot,
        &addresses,
        None,
        PaymentMethod::default(),
        "",
        None,
        None,
    )
}

/// Place the order.
///
/// Validation happens before anything touches the backend. On a backend
/// failure the page re-renders with the submitted state preserved and the
/// failure turned into a customer-facing message; the verification gate
/// gets its own banner with the fields left to verify.
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response, AppError> {
    let snapshot: CartSnapshot = serde_json::from_str(&form.items).unwrap_or_default();
    let Some(payment_method) = PaymentMethod::parse(&form.payment_method) else {
        return Err(AppError::BadRequest("Unknown payment method".to_string()));
    };
    let selected = form
        .address_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(AddressId::new);
    let note = form.note.as_deref().unwrap_or("");

    let draft = match checkout::build_order_draft(
        selected.clone(),
        snapshot.draft_items(),
        payment_method,
        Some(note),
    ) {
        Ok(draft) => draft,
        Err(message) => {
            // Precondition failed; nothing was sent to the backend. The
            // submitted snapshot is all we need to re-render: an address-less
            // submission means the customer has no addresses to list.
            let template = checkout_page(
                &snapshot,
                &[],
                selected.as_ref(),
                payment_method,
                note,
                Some(message.to_string()),
                None,
            )?;
            return Ok(template.into_response());
        }
    };

    error::add_breadcrumb("checkout", "Placing order");

    match state.commerce().create_order(&auth.token, &draft).await {
        Ok(()) => Ok(Redirect::to("/checkout/confirmation").into_response()),
        Err(err) => {
            warn!(error = %err, "Order placement failed");
            let message = checkout::order_failure_message(&err);
            let (error_message, trust_message) = match &err {
                CommerceError::VerificationRequired { .. } => (None, Some(message)),
                _ => (Some(message), None),
            };

            let addresses = match state.commerce().get_addresses(&auth.token).await {
                Ok(addresses) => addresses,
                Err(fetch_err) => {
                    warn!(error = %fetch_err, "Failed to reload addresses after order failure");
                    Vec::new()
                }
            };

            let template = checkout_page(
                &snapshot,
                &addresses,
                selected.as_ref(),
                payment_method,
                note,
                error_message,
                trust_message,
            )?;
            Ok(template.into_response())
        }
    }
}

/// Display the order confirmation page.
pub async fn confirmation(RequireAuth(_auth): RequireAuth) -> ConfirmationTemplate {
    ConfirmationTemplate { logged_in: true }
}

/// Assemble the checkout page from a snapshot and the saved addresses.
fn checkout_page(
    snapshot: &CartSnapshot,
    addresses: &[Address],
    selected: Option<&AddressId>,
    payment_method: PaymentMethod,
    note: &str,
    error: Option<String>,
    trust_message: Option<String>,
) -> Result<CheckoutPageTemplate, AppError> {
    let snapshot_json = serde_json::to_string(snapshot)
        .map_err(|e| AppError::Internal(format!("failed to encode cart snapshot: {e}")))?;

    let effective = checkout::effective_address_id(addresses, selected);

    Ok(CheckoutPageTemplate {
        items: snapshot
            .items
            .iter()
            .map(|line| SummaryLineView {
                name: line.name.clone(),
                quantity: line.quantity,
                price: line.price.format(),
            })
            .collect(),
        subtotal: snapshot.total.format(),
        snapshot_json,
        addresses: addresses
            .iter()
            .map(|address| AddressOptionView {
                id: address.id.as_str().to_string(),
                full_name: address.full_name.clone(),
                phone: address.phone.clone(),
                summary: address.summary(),
                is_default: address.is_default,
                checked: effective.as_ref() == Some(&address.id),
            })
            .collect(),
        payment_options: PaymentMethod::ALL
            .into_iter()
            .map(|method| PaymentOptionView {
                value: method.as_str(),
                label: method.label(),
                description: method.description(),
                checked: method == payment_method,
            })
            .collect(),
        note: note.to_string(),
        error,
        trust_message,
        logged_in: true,
    })
}
