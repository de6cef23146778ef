//! Subcommand implementations.
//!
//! Each command prints plain text to stdout. Formatting lives here so the
//! line layouts can be tested without a backend.

pub mod account;
pub mod cart;
pub mod orders;
pub mod products;

use savat_storefront::models::{PricedOrder, Product};

/// One catalog line: `#id  price  title [category]`.
pub fn product_row(product: &Product) -> String {
    let category = if product.category.is_empty() {
        String::new()
    } else {
        format!(" [{}]", product.category)
    };
    format!(
        "#{:<4} {:>10}  {}{category}",
        product.id,
        product.unit_price().to_string(),
        product.title
    )
}

/// Order heading followed by one indented line per product.
pub fn order_block(priced: &PricedOrder) -> String {
    let date = priced
        .order
        .date
        .map_or_else(String::new, |date| format!("  {}", date.format("%Y-%m-%d")));
    let mut out = format!(
        "Order #{} (user {}){date}  total {}",
        priced.order.id, priced.order.user_id, priced.total
    );
    for line in &priced.lines {
        let title = line
            .product
            .as_ref()
            .map_or_else(|| "(unavailable)".to_string(), |p| p.title.clone());
        out.push_str(&format!(
            "\n  {} x #{} {title}",
            line.line.quantity, line.line.product_id
        ));
    }
    out
}
