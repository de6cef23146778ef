//! Product snapshot types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use savat_core::{CurrencyCode, Price, ProductId};

/// A catalog product as returned by the backend.
///
/// Only `id` and `price` are required; every other field defaults so that a
/// trimmed snapshot persisted by an older build still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    /// Units on hand, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl Product {
    /// Unit price in the storefront currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, CurrencyCode::USD)
    }
}

/// Aggregated review score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_product() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 109.95,
            "description": "Your perfect pack",
            "category": "men's clothing",
            "image": "https://example.com/1.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(10995, 2));
        assert_eq!(product.rating.unwrap().count, 120);
        assert_eq!(product.stock, None);
    }

    #[test]
    fn test_minimal_snapshot() {
        let product: Product = serde_json::from_str(r#"{"id": 2, "price": "10"}"#).unwrap();
        assert_eq!(product.unit_price().to_string(), "$10.00");
        assert!(product.title.is_empty());
    }
}
