//! Pasal Core - Shared domain types.
//!
//! This crate provides common types used across the Pasal workspace:
//! - `storefront` - Customer-facing e-commerce site
//! - `integration-tests` - End-to-end coverage for the storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Ids,
//! amounts, payment methods and statuses live here so the storefront and
//! its tests share one vocabulary.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, payment
//!   methods and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
