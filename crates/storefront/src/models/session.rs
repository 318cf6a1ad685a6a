//! Session-related types.

use serde::{Deserialize, Serialize};

use pasal_core::UserId;

/// Authentication state stored in the session.
///
/// The commerce backend issues a bearer token at login and every
/// authenticated call replays it. The user rides along so pages can greet
/// the customer without a profile fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAuth {
    pub token: String,
    pub user: SessionUser,
}

/// The logged-in user as stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
}

/// Session keys.
pub mod keys {
    /// Key for [`SessionAuth`](super::SessionAuth).
    pub const AUTH: &str = "auth";

    /// Key for the email address awaiting OTP verification.
    pub const PENDING_OTP_EMAIL: &str = "pending_otp_email";
}
