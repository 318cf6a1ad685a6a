//! Cached value types for catalog reads.

use super::types::{Brand, Product};

/// Values stored in the catalog cache.
///
/// Only catalog reads are cached. Cart, order, address and wishlist
/// responses are the mutable state the storefront re-fetches after every
/// write, so they never enter this cache.
#[derive(Debug, Clone)]
pub enum CacheValue {
    /// A single product, boxed to keep the enum small.
    Product(Box<Product>),
    /// The product listing for one search/brand combination.
    Products(Vec<Product>),
    /// The featured products for the home page.
    Featured(Vec<Product>),
    /// All brands.
    Brands(Vec<Brand>),
}
