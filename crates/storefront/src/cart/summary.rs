//! Derived cart values.

use rust_decimal::Decimal;

use savat_core::{CurrencyCode, Price};

use super::CartLineItem;

/// Counts and totals computed from the current lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Number of distinct lines.
    pub line_count: usize,
    /// Sum of quantities.
    pub unit_count: u64,
    /// Sum of `price × quantity` over lines with a product snapshot.
    pub total: Price,
}

impl CartSummary {
    /// Summarize `items`.
    #[must_use]
    pub fn of(items: &[CartLineItem]) -> Self {
        let total = items
            .iter()
            .filter_map(CartLineItem::line_total)
            .fold(Decimal::ZERO, |acc, price| acc + price.amount);

        Self {
            line_count: items.len(),
            unit_count: items.iter().map(|line| u64::from(line.quantity)).sum(),
            total: Price::new(total, CurrencyCode::USD),
        }
    }

    /// Whether there is nothing in the cart.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.line_count == 0
    }
}

#[cfg(test)]
mod tests {
    use savat_core::ProductId;

    use super::*;
    use crate::models::Product;

    fn line(id: u64, price: Decimal, quantity: u32) -> CartLineItem {
        CartLineItem::new(
            Product {
                id: ProductId::new(id),
                title: String::new(),
                price,
                description: String::new(),
                category: String::new(),
                image: String::new(),
                rating: None,
                stock: None,
            },
            quantity,
        )
    }

    #[test]
    fn test_empty() {
        let summary = CartSummary::of(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.unit_count, 0);
        assert_eq!(summary.total.to_string(), "$0.00");
    }

    #[test]
    fn test_totals() {
        let items = vec![
            line(1, Decimal::new(1995, 2), 2),
            line(2, Decimal::from(5), 3),
        ];
        let summary = CartSummary::of(&items);
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.unit_count, 5);
        assert_eq!(summary.total.amount, Decimal::new(5490, 2));
    }

    #[test]
    fn test_lines_without_snapshot_count_units_only() {
        let items = vec![
            line(1, Decimal::from(10), 1),
            CartLineItem {
                product_id: ProductId::new(2),
                product: None,
                quantity: 4,
            },
        ];
        let summary = CartSummary::of(&items);
        assert_eq!(summary.unit_count, 5);
        assert_eq!(summary.total.amount, Decimal::from(10));
    }
}
