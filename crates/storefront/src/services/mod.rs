//! Business logic services.
//!
//! The pure halves of the request flows: everything here is synchronous,
//! side-effect free, and unit-testable without HTTP. Route handlers wire
//! these into the commerce client.

pub mod auth;
pub mod checkout;
