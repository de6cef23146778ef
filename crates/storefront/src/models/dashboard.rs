//! Admin dashboard figures.

use std::collections::HashMap;

use rust_decimal::Decimal;

use savat_core::{CurrencyCode, Price, ProductId};

use super::{Order, PricedOrder, Product};

/// How many orders the dashboard lists in full.
pub const RECENT_ORDER_COUNT: usize = 5;

/// Aggregate figures over every order and the product catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub order_count: usize,
    pub product_count: usize,
    pub category_count: usize,
    pub units_ordered: u64,
    /// Revenue at current catalog prices. Lines for products no longer in the
    /// catalog contribute nothing.
    pub revenue: Price,
    /// The first [`RECENT_ORDER_COUNT`] orders as the backend returned them.
    pub recent_orders: Vec<PricedOrder>,
}

impl DashboardStats {
    /// Compute the figures from already-fetched collections.
    #[must_use]
    pub fn compute(orders: Vec<Order>, products: &[Product], categories: &[String]) -> Self {
        let catalog: HashMap<ProductId, &Product> =
            products.iter().map(|product| (product.id, product)).collect();
        let lookup = |id: ProductId| catalog.get(&id).map(|product| (*product).clone());

        let order_count = orders.len();
        let units_ordered = orders.iter().map(Order::unit_count).sum();

        let priced: Vec<PricedOrder> = orders
            .into_iter()
            .map(|order| PricedOrder::new(order, lookup))
            .collect();
        let revenue = priced
            .iter()
            .fold(Decimal::ZERO, |acc, order| acc + order.total.amount);

        Self {
            order_count,
            product_count: products.len(),
            category_count: categories.len(),
            units_ordered,
            revenue: Price::new(revenue, CurrencyCode::USD),
            recent_orders: priced.into_iter().take(RECENT_ORDER_COUNT).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use savat_core::{OrderId, UserId};

    use super::*;
    use crate::models::OrderLine;

    fn product(id: u64, price: &str) -> Product {
        serde_json::from_value(serde_json::json!({ "id": id, "price": price })).unwrap()
    }

    fn order(id: u64, lines: &[(u64, u32)]) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(1),
            date: None,
            products: lines
                .iter()
                .map(|&(product_id, quantity)| OrderLine {
                    product_id: ProductId::new(product_id),
                    quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_compute_totals() {
        let products = [product(1, "10.00"), product(2, "2.50")];
        let categories = ["a".to_string()];
        let orders = vec![order(1, &[(1, 2), (2, 4)]), order(2, &[(99, 3)])];

        let stats = DashboardStats::compute(orders, &products, &categories);
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.product_count, 2);
        assert_eq!(stats.category_count, 1);
        assert_eq!(stats.units_ordered, 9);
        assert_eq!(stats.revenue.to_string(), "$30.00");
    }

    #[test]
    fn test_recent_orders_capped() {
        let orders = (1..=8).map(|id| order(id, &[])).collect();
        let stats = DashboardStats::compute(orders, &[], &[]);
        assert_eq!(stats.order_count, 8);
        assert_eq!(stats.recent_orders.len(), RECENT_ORDER_COUNT);
        assert_eq!(stats.recent_orders[0].order.id, OrderId::new(1));
        assert_eq!(stats.revenue.amount, Decimal::ZERO);
    }
}
