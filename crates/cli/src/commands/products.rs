//! Catalog browsing.

use savat_core::ProductId;
use savat_storefront::api::SortOrder;
use savat_storefront::{Result, Storefront};

use super::product_row;

/// List products, optionally filtered by category.
pub async fn list(
    shop: &Storefront,
    limit: Option<u32>,
    sort: Option<SortOrder>,
    category: Option<&str>,
) -> Result<()> {
    let products = shop.products(limit, sort, category).await?;
    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in &products {
        println!("{}", product_row(product));
    }
    Ok(())
}

/// Show one product in full.
pub async fn show(shop: &Storefront, id: ProductId) -> Result<()> {
    let product = shop.product(id).await?;
    println!("{}", product.title);
    println!("Price:    {}", product.unit_price());
    if !product.category.is_empty() {
        println!("Category: {}", product.category);
    }
    if let Some(rating) = product.rating {
        println!("Rating:   {:.1} ({} reviews)", rating.rate, rating.count);
    }
    if let Some(stock) = product.stock {
        println!("In stock: {stock}");
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }

    let in_cart = shop.cart().quantity_of(id);
    if in_cart > 0 {
        println!();
        println!("In your cart: {in_cart}");
    }
    Ok(())
}

/// List category names.
pub async fn categories(shop: &Storefront) -> Result<()> {
    for category in shop.categories().await? {
        println!("{category}");
    }
    Ok(())
}
