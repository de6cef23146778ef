//! Cart and session state across storefront restarts on the same storage file.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::fs;

use savat_core::ProductId;
use savat_integration_tests::TestContext;
use savat_storefront::storage::keys;

#[tokio::test]
async fn test_cart_rehydrates_with_snapshots() {
    let ctx = TestContext::new().await.unwrap();
    let mut shop = ctx.open().unwrap();
    shop.add_to_cart(ProductId::new(2), 3).await.unwrap();
    shop.set_quantity(ProductId::new(2), 2).unwrap();
    shop.dispose();

    let reopened = ctx.open().unwrap();
    let items = reopened.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].product.as_ref().unwrap().title, "Leather Tote");
    assert_eq!(reopened.cart().summary().total.to_string(), "$111.98");
}

#[tokio::test]
async fn test_clear_leaves_no_cart_entry() {
    let ctx = TestContext::new().await.unwrap();
    let mut shop = ctx.open().unwrap();
    shop.add_to_cart(ProductId::new(1), 1).await.unwrap();
    shop.clear_cart();
    shop.dispose();

    let raw = fs::read_to_string(&ctx.config().storage_path).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(document.get(keys::CART).is_none());
    assert!(ctx.open().unwrap().cart().items().is_empty());
}

#[tokio::test]
async fn test_corrupted_storage_file_starts_empty() {
    let ctx = TestContext::new().await.unwrap();
    fs::write(&ctx.config().storage_path, "not json at all").unwrap();

    let mut shop = ctx.open().unwrap();
    assert!(shop.cart().items().is_empty());
    assert!(!shop.session().is_authenticated());

    shop.add_to_cart(ProductId::new(4), 1).await.unwrap();
    shop.dispose();
    assert_eq!(ctx.open().unwrap().cart().items().len(), 1);
}

#[tokio::test]
async fn test_corrupted_cart_entry_is_purged() {
    let ctx = TestContext::new().await.unwrap();
    let document = serde_json::json!({ keys::CART: "[{\"productId\": \"x\"}]" });
    fs::write(&ctx.config().storage_path, document.to_string()).unwrap();

    let shop = ctx.open().unwrap();
    assert!(shop.cart().items().is_empty());
    shop.dispose();

    let raw = fs::read_to_string(&ctx.config().storage_path).unwrap();
    assert!(!raw.contains(keys::CART));
}
