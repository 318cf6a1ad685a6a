//! Saved address route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::error;

use crate::commerce::types::{Address, NewAddress};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Address display data.
#[derive(Clone)]
pub struct AddressView {
    pub full_name: String,
    pub phone: String,
    pub summary: String,
    pub landmark: Option<String>,
    pub is_default: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            summary: address.summary(),
            landmark: address.landmark.clone(),
            is_default: address.is_default,
        }
    }
}

/// Addresses page template.
#[derive(Template, WebTemplate)]
#[template(path = "addresses/index.html")]
pub struct AddressesTemplate {
    pub addresses: Vec<AddressView>,
    pub error: Option<String>,
    pub logged_in: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewAddressForm {
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub district: String,
    pub municipality: String,
    pub ward_no: String,
    pub area: String,
    pub landmark: Option<String>,
    /// Checkbox: present (`on`) when ticked, absent otherwise.
    pub is_default: Option<String>,
}

impl NewAddressForm {
    fn into_new_address(self) -> NewAddress {
        NewAddress {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            province: self.province.trim().to_string(),
            district: self.district.trim().to_string(),
            municipality: self.municipality.trim().to_string(),
            ward_no: self.ward_no.trim().to_string(),
            area: self.area.trim().to_string(),
            landmark: self
                .landmark
                .map(|landmark| landmark.trim().to_string())
                .filter(|landmark| !landmark.is_empty()),
            is_default: self.is_default.is_some(),
        }
    }
}

/// Display the saved addresses with the creation form.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<AddressesTemplate, AppError> {
    let addresses = state.commerce().get_addresses(&auth.token).await?;

    Ok(AddressesTemplate {
        addresses: addresses.iter().map(AddressView::from).collect(),
        error: None,
        logged_in: true,
    })
}

/// Create an address, then redirect back so the list re-fetches.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<NewAddressForm>,
) -> Result<Response, AppError> {
    let address = form.into_new_address();

    match state.commerce().create_address(&auth.token, &address).await {
        Ok(()) => Ok(Redirect::to("/account/addresses").into_response()),
        Err(err) => {
            error!(error = %err, "Failed to create address");
            let addresses = state.commerce().get_addresses(&auth.token).await?;
            Ok(AddressesTemplate {
                addresses: addresses.iter().map(AddressView::from).collect(),
                error: Some("Failed to save the address. Please check the fields and try again.".to_string()),
                logged_in: true,
            }
            .into_response())
        }
    }
}
