//! Session middleware configuration.
//!
//! Sessions live in an in-memory store: the storefront keeps no database,
//! and the only session payload is the commerce API token plus the user it
//! belongs to. Cookies are signed with the configured session secret so a
//! tampered cookie never reaches a handler.

use secrecy::ExposeSecret;
use tower_sessions::cookie::{Key, SameSite, time};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pasal_session";

/// Session expiry in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session middleware layer.
///
/// The `Secure` cookie attribute follows the configured base URL, so local
/// HTTP development works while production HTTPS cookies stay locked down.
#[must_use]
pub fn create_session_layer(
    config: &StorefrontConfig,
) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    let store = MemoryStore::default();
    // Key::derive_from needs 32+ bytes of material; config validation
    // guarantees the secret is at least that long.
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
