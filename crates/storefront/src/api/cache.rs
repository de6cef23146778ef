//! Cache types for catalog responses.

use savat_core::ProductId;

use super::SortOrder;
use crate::models::Product;

/// Cache key for product lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products {
        limit: Option<u32>,
        sort: Option<SortOrder>,
    },
    Categories,
    Category {
        name: String,
        limit: Option<u32>,
        sort: Option<SortOrder>,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<String>),
}
