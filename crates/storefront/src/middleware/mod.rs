//! HTTP middleware for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (attached in `main`; capture errors and transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (tag each request with a unique id)
//! 4. Session layer (signed cookies, in-memory store)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
