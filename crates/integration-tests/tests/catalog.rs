//! Catalog reads, caching, and admin mutation against the mock service.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use copperpot_client::api::ApiError;
use copperpot_client::models::NewProduct;
use copperpot_core::{Price, ProductId};

use copperpot_integration_tests::{MockShop, product};

#[tokio::test]
async fn test_products_are_cached_within_ttl() {
    let shop = MockShop::spawn().await;
    shop.seed_products(vec![product(1, "Desk Lamp", 2499, Some(10))]);
    let state = shop.app_state();

    let first = state.api().products().await.unwrap();
    let second = state.api().products().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        shop.state.product_list_hits.load(Ordering::SeqCst),
        1,
        "second read must come from the cache"
    );
}

#[tokio::test]
async fn test_missing_product_surfaces_server_message() {
    let shop = MockShop::spawn().await;
    let state = shop.app_state();

    let err = state.api().product(ProductId::new(404)).await.unwrap_err();
    match err {
        ApiError::Remote { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("Product not found"));
        }
        other => panic!("expected a remote error, got {other}"),
    }
}

#[tokio::test]
async fn test_create_product_invalidates_catalog_cache() {
    let shop = MockShop::spawn().await;
    shop.seed_products(vec![product(1, "Desk Lamp", 2499, Some(10))]);
    let state = shop.app_state();
    state.sessions().login("tok", "ADMIN", "Ada", "L").unwrap();

    assert_eq!(state.api().products().await.unwrap().len(), 1);

    let created = state
        .api()
        .create_product(&NewProduct {
            name: "Monitor Arm".to_owned(),
            description: None,
            price: Price::from_cents(7999),
            image_url: None,
            category_id: None,
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Monitor Arm");

    // The next read misses the cache and sees the new product.
    let products = state.api().products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(shop.state.product_list_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_update_product_changes_catalog() {
    let shop = MockShop::spawn().await;
    shop.seed_products(vec![product(1, "Desk Lamp", 2499, Some(10))]);
    let state = shop.app_state();
    state.sessions().login("tok", "ADMIN", "Ada", "L").unwrap();

    let updated = state
        .api()
        .update_product(
            ProductId::new(1),
            &NewProduct {
                name: "Desk Lamp v2".to_owned(),
                description: Some("Brighter".to_owned()),
                price: Price::from_cents(2999),
                image_url: None,
                category_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Desk Lamp v2");
    assert_eq!(updated.price, Price::from_cents(2999));

    let fetched = state.api().product(ProductId::new(1)).await.unwrap();
    assert_eq!(fetched.name, "Desk Lamp v2");
}

#[tokio::test]
async fn test_order_history_reflects_placed_orders() {
    let shop = MockShop::spawn().await;
    shop.seed_products(vec![product(1, "Desk Lamp", 2499, Some(10))]);
    let state = shop.app_state();
    state
        .sessions()
        .login("tok", "CUSTOMER", "Sam", "Shopper")
        .unwrap();

    let lamp = state.api().product(ProductId::new(1)).await.unwrap();
    state.cart().add_item(&lamp).unwrap();
    state.cart().add_item(&lamp).unwrap();
    state.checkout().checkout().await.unwrap();

    let orders = state.api().orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total_amount, Price::from_cents(4998));
    assert_eq!(orders[0].items[0].product_name, "Desk Lamp");
    assert_eq!(orders[0].items[0].quantity, 2);
}
