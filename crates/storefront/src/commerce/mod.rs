//! Commerce backend integration.
//!
//! The storefront owns no data. Carts, orders, addresses, wishlists and the
//! catalog all live in a remote commerce API; this module is the only place
//! that talks to it. Responses pass through exactly one normalization
//! boundary ([`wire`] + [`convert`]) so the rest of the crate works with
//! canonical types and never sees backend shape variance.
//!
//! # Module Structure
//!
//! - `client` - HTTP client with catalog caching
//! - `wire` - Tolerant deserialization of backend payloads
//! - `convert` - Wire-to-canonical mapping
//! - `types` - Canonical commerce types
//! - `cache` - Cached value types for catalog reads

mod cache;
mod client;
pub mod convert;
pub mod types;
pub mod wire;

pub use client::CommerceClient;

use thiserror::Error;

/// Message the backend sends when identity verification gates ordering.
pub const VERIFICATION_REQUIRED_MESSAGE: &str = "Insufficient verification to place orders";

/// Errors from commerce backend operations.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Network-level failure talking to the backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not parse as the expected JSON shape.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but was missing fields the operation needs.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request needs a valid token and did not have one.
    #[error("Unauthorized")]
    Unauthorized,

    /// The account must complete verification before placing orders.
    #[error("Verification required ({})", format_missing(.missing))]
    VerificationRequired { missing: Vec<String> },

    /// Any other non-success response from the backend.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },
}

impl CommerceError {
    /// The backend-supplied message, when the failure carried a usable one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Backend { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

fn format_missing(missing: &[String]) -> String {
    if missing.is_empty() {
        "no details".to_string()
    } else {
        format!("missing: {}", missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = CommerceError::NotFound("Product not found: aloo-chips".to_string());
        assert_eq!(error.to_string(), "Not found: Product not found: aloo-chips");
    }

    #[test]
    fn test_backend_error_display() {
        let error = CommerceError::Backend {
            status: 500,
            message: "internal error".to_string(),
        };
        assert_eq!(error.to_string(), "Backend error (500): internal error");
    }

    #[test]
    fn test_verification_required_display_with_fields() {
        let error = CommerceError::VerificationRequired {
            missing: vec!["email".to_string(), "phone".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Verification required (missing: email, phone)"
        );
    }

    #[test]
    fn test_verification_required_display_without_fields() {
        let error = CommerceError::VerificationRequired { missing: vec![] };
        assert_eq!(error.to_string(), "Verification required (no details)");
    }

    #[test]
    fn test_backend_message_present() {
        let error = CommerceError::Backend {
            status: 409,
            message: "Product out of stock".to_string(),
        };
        assert_eq!(error.backend_message(), Some("Product out of stock"));
    }

    #[test]
    fn test_backend_message_absent_for_transport_errors() {
        let error = CommerceError::Unauthorized;
        assert_eq!(error.backend_message(), None);
    }
}
