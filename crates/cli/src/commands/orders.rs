//! Checkout, order history and the admin dashboard.

use savat_core::OrderId;
use savat_storefront::models::PricedOrder;
use savat_storefront::{Result, Storefront};

use super::order_block;

pub async fn checkout(shop: &mut Storefront) -> Result<()> {
    let total = shop.cart().summary().total;
    let order = shop.checkout().await?;
    println!(
        "Order #{} placed: {} unit(s), {total}.",
        order.id,
        order.unit_count()
    );
    Ok(())
}

pub async fn mine(shop: &mut Storefront) -> Result<()> {
    print_orders(&shop.my_orders().await?);
    Ok(())
}

pub async fn all(shop: &mut Storefront) -> Result<()> {
    print_orders(&shop.all_orders().await?);
    Ok(())
}

pub async fn show(shop: &mut Storefront, id: OrderId) -> Result<()> {
    println!("{}", order_block(&shop.order(id).await?));
    Ok(())
}

pub async fn dashboard(shop: &mut Storefront) -> Result<()> {
    let stats = shop.dashboard().await?;
    println!("Orders:        {}", stats.order_count);
    println!("Products:      {}", stats.product_count);
    println!("Categories:    {}", stats.category_count);
    println!("Units ordered: {}", stats.units_ordered);
    println!("Revenue:       {}", stats.revenue);

    if !stats.recent_orders.is_empty() {
        println!();
        println!("Recent orders:");
        print_orders(&stats.recent_orders);
    }
    Ok(())
}

fn print_orders(orders: &[PricedOrder]) {
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    for (i, order) in orders.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", order_block(order));
    }
}
