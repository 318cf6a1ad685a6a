//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Order status as reported by the commerce API.
///
/// The backend owns the lifecycle; the storefront renders the status and
/// decides whether to offer cancellation. Statuses this client has never
/// heard of deserialize to [`OrderStatus::Unknown`] instead of failing the
/// whole order payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// The wire/display name (`"PENDING"`, `"CANCELLED"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether the customer may still cancel an order in this status.
    ///
    /// Delivered and cancelled orders are final. Unknown statuses are
    /// treated as final too: the client cannot reason about them.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Delivered | Self::Unknown)
    }
}
