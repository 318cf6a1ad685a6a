//! Error handling for the storefront.
//!
//! [`AppError`] is the error type route handlers return. Its
//! `IntoResponse` impl maps each variant to a status code and a safe
//! user-facing message, and reports genuine server faults to Sentry;
//! expected conditions (not found, auth, backend validation) are never
//! reported.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::commerce::CommerceError;

/// Application error type for route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// A commerce backend call failed.
    #[error("Commerce API error: {0}")]
    Commerce(#[from] CommerceError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication required.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Commerce(commerce) => match commerce {
                CommerceError::NotFound(_) => StatusCode::NOT_FOUND,
                CommerceError::Unauthorized => StatusCode::UNAUTHORIZED,
                CommerceError::VerificationRequired { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CommerceError::Backend { status, .. } if *status >= 500 => StatusCode::BAD_GATEWAY,
                CommerceError::Backend { .. } => StatusCode::BAD_REQUEST,
                CommerceError::Http(_) | CommerceError::Parse(_) | CommerceError::Malformed(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the customer.
    ///
    /// Backend-authored messages pass through (they are written for
    /// customers); transport and internal details never leak.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Commerce(commerce) => match commerce {
                CommerceError::NotFound(_) => "Not found".to_string(),
                CommerceError::Unauthorized => "Please log in to continue".to_string(),
                CommerceError::VerificationRequired { .. } => {
                    "Account verification required".to_string()
                }
                CommerceError::Backend { message, .. } if !message.is_empty() => message.clone(),
                _ => "The store could not reach the backend. Please try again.".to_string(),
            },
            Self::NotFound(_) => "Page not found".to_string(),
            Self::Unauthorized(_) => "Please log in to continue".to_string(),
            Self::BadRequest(message) => message.clone(),
            Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Whether this error is a fault on our side worth reporting.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Commerce(commerce) => matches!(
                commerce,
                CommerceError::Http(_)
                    | CommerceError::Parse(_)
                    | CommerceError::Malformed(_)
                    | CommerceError::Backend { status: 500.., .. }
            ),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, "Request failed");
            sentry::capture_error(&self);
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Attach the logged-in user to the Sentry scope.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(ToString::to_string),
            ..Default::default()
        }));
    });
}

/// Clear the user from the Sentry scope (on logout).
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a breadcrumb for Sentry error context.
///
/// Used at commerce checkpoints (add to cart, place order) so an error
/// report shows what the customer was doing.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        let error = AppError::NotFound("no such page".to_string());
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.user_message(), "Page not found");
    }

    #[test]
    fn test_commerce_unauthorized_status() {
        let error = AppError::Commerce(CommerceError::Unauthorized);
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_backend_4xx_message_passes_through() {
        let error = AppError::Commerce(CommerceError::Backend {
            status: 409,
            message: "Product out of stock".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.user_message(), "Product out of stock");
        assert!(!error.is_server_error());
    }

    #[test]
    fn test_backend_5xx_is_server_error() {
        let error = AppError::Commerce(CommerceError::Backend {
            status: 503,
            message: "upstream down".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        assert!(error.is_server_error());
    }

    #[test]
    fn test_transport_error_hides_details() {
        let error = AppError::Commerce(CommerceError::Malformed("weird body".to_string()));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!error.user_message().contains("weird body"));
        assert!(error.is_server_error());
    }

    #[test]
    fn test_internal_error_hides_details() {
        let error = AppError::Internal("session store exploded".to_string());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.user_message(), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_display_includes_source() {
        let error = AppError::Commerce(CommerceError::NotFound("Order not found: o1".to_string()));
        assert_eq!(
            error.to_string(),
            "Commerce API error: Not found: Order not found: o1"
        );
    }
}
