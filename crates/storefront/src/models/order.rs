//! Order records (the backend's `carts` resource).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use savat_core::{CurrencyCode, OrderId, Price, ProductId, UserId};

use super::Product;

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub products: Vec<OrderLine>,
}

impl Order {
    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.products.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// One product/quantity pair inside an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// An order with each line resolved to a product where possible.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub order: Order,
    pub lines: Vec<PricedLine>,
    /// Sum over lines whose product resolved; unknown products count as zero.
    pub total: Price,
}

/// An order line and the product it refers to, when known.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub line: OrderLine,
    pub product: Option<Product>,
}

impl PricedOrder {
    /// Price `order` using `lookup` to resolve product IDs.
    #[must_use]
    pub fn new(order: Order, lookup: impl Fn(ProductId) -> Option<Product>) -> Self {
        let lines: Vec<PricedLine> = order
            .products
            .iter()
            .map(|line| PricedLine {
                line: *line,
                product: lookup(line.product_id),
            })
            .collect();

        let total = lines
            .iter()
            .filter_map(|priced| {
                priced
                    .product
                    .as_ref()
                    .map(|product| product.unit_price().times(priced.line.quantity).amount)
            })
            .fold(Decimal::ZERO, |acc, amount| acc + amount);

        Self {
            order,
            lines,
            total: Price::new(total, CurrencyCode::USD),
        }
    }
}
