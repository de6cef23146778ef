//! End-to-end shopping: browse, fill the cart, sign in, check out.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use savat_core::{OrderId, ProductId};
use savat_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, CUSTOMER_EMAIL, CUSTOMER_PASSWORD, TestContext};
use savat_storefront::AppError;
use savat_storefront::api::SortOrder;
use savat_storefront::session::SessionError;
use secrecy::SecretString;

#[tokio::test]
async fn test_browse_catalog() {
    let ctx = TestContext::new().await.unwrap();
    let shop = ctx.open().unwrap();

    let newest = shop.products(Some(2), Some(SortOrder::Desc), None).await.unwrap();
    assert_eq!(
        newest.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![ProductId::new(4), ProductId::new(3)]
    );

    let bags = shop.products(None, None, Some("bags")).await.unwrap();
    assert_eq!(bags.len(), 2);
    assert!(bags.iter().all(|p| p.category == "bags"));

    assert_eq!(shop.categories().await.unwrap(), vec!["bags", "tech"]);
    assert!(matches!(
        shop.product(ProductId::new(42)).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_guest_cart_then_checkout() {
    let ctx = TestContext::new().await.unwrap();
    let mut shop = ctx.open().unwrap();

    shop.add_to_cart(ProductId::new(3), 2).await.unwrap();
    shop.add_to_cart(ProductId::new(4), 1).await.unwrap();
    shop.add_to_cart(ProductId::new(3), 1).await.unwrap();

    let summary = shop.cart().summary();
    assert_eq!(summary.line_count, 2);
    assert_eq!(summary.unit_count, 4);
    assert_eq!(summary.total.to_string(), "$82.89");

    assert!(matches!(
        shop.checkout().await.unwrap_err(),
        AppError::Session(SessionError::NotSignedIn)
    ));
    assert_eq!(shop.cart().items().len(), 2);

    shop.login(CUSTOMER_EMAIL, &SecretString::from(CUSTOMER_PASSWORD))
        .await
        .unwrap();
    let order = shop.checkout().await.unwrap();
    assert_eq!(order.unit_count(), 4);
    assert!(shop.cart().items().is_empty());

    let placed = ctx.backend.orders();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0]["products"][0]["productId"], 3);
    assert_eq!(placed[0]["products"][0]["quantity"], 3);

    let mine = shop.my_orders().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].total.to_string(), "$82.89");
    assert_eq!(mine[0].lines[0].product.as_ref().unwrap().title, "Wireless Mouse");
}

#[tokio::test]
async fn test_quantity_ceiling_is_enforced_before_fetching() {
    let ctx = TestContext::new().await.unwrap();
    let mut shop = ctx.open().unwrap();

    shop.add_to_cart(ProductId::new(1), 99).await.unwrap();
    let before = ctx.backend.request_count();

    let err = shop.add_to_cart(ProductId::new(1), 1).await.unwrap_err();
    assert!(matches!(err, AppError::Quantity(_)));
    assert_eq!(ctx.backend.request_count(), before);
    assert_eq!(shop.cart().quantity_of(ProductId::new(1)), 99);
}

#[tokio::test]
async fn test_admin_dashboard_and_order_access() {
    let ctx = TestContext::new().await.unwrap();

    let mut customer = ctx.open().unwrap();
    customer
        .login(CUSTOMER_EMAIL, &SecretString::from(CUSTOMER_PASSWORD))
        .await
        .unwrap();
    customer.add_to_cart(ProductId::new(2), 2).await.unwrap();
    let order = customer.checkout().await.unwrap();
    assert!(matches!(
        customer.dashboard().await.unwrap_err(),
        AppError::Session(SessionError::Forbidden)
    ));
    assert!(customer.order(order.id).await.is_ok());
    assert!(matches!(
        customer.order(OrderId::new(77)).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    customer.logout();
    customer.dispose();

    let mut admin = ctx.open().unwrap();
    admin
        .login(ADMIN_EMAIL, &SecretString::from(ADMIN_PASSWORD))
        .await
        .unwrap();
    let stats = admin.dashboard().await.unwrap();
    assert_eq!(stats.order_count, 1);
    assert_eq!(stats.product_count, 4);
    assert_eq!(stats.category_count, 2);
    assert_eq!(stats.units_ordered, 2);
    assert_eq!(stats.revenue.to_string(), "$111.98");
    assert_eq!(admin.all_orders().await.unwrap().len(), 1);
    assert_eq!(admin.order(order.id).await.unwrap().order.id, order.id);
}
