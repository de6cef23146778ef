//! Cart commands. The cart persists between runs.

use savat_core::ProductId;
use savat_storefront::{Result, Storefront};

/// Print every line and the cart total.
pub fn show(shop: &Storefront) {
    let cart = shop.cart();
    if cart.items().is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.items() {
        let title = line
            .product
            .as_ref()
            .map_or("(details unavailable)", |p| p.title.as_str());
        let total = line
            .line_total()
            .map_or_else(|| "-".to_string(), |price| price.to_string());
        println!(
            "#{:<4} {:>3} x {title:<40} {total:>10}",
            line.product_id, line.quantity
        );
    }

    let summary = cart.summary();
    println!(
        "{} item(s), {} unit(s), total {}",
        summary.line_count, summary.unit_count, summary.total
    );
}

pub async fn add(shop: &mut Storefront, id: ProductId, quantity: u32) -> Result<()> {
    shop.add_to_cart(id, quantity).await?;
    println!(
        "Added {quantity} x #{id}. Now {} in cart.",
        shop.cart().quantity_of(id)
    );
    Ok(())
}

pub fn set(shop: &mut Storefront, id: ProductId, quantity: i64) -> Result<()> {
    shop.set_quantity(id, quantity)?;
    if quantity == 0 {
        println!("Removed #{id}.");
    } else {
        println!("Set #{id} to {quantity}.");
    }
    Ok(())
}

pub fn remove(shop: &mut Storefront, id: ProductId) {
    shop.remove_from_cart(id);
    println!("Removed #{id}.");
}

pub fn clear(shop: &mut Storefront) {
    shop.clear_cart();
    println!("Cart cleared.");
}
