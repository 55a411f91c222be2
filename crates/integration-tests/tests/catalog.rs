//! Catalog and health services against the mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use sabor_core::pricing::project_discounts;
use sabor_core::{ApiStatus, Price, ProductId};
use sabor_integration_tests::{MockBackend, MockOptions, ProductLookup, unreachable_url};
use sabor_storefront::api::ApiClient;
use sabor_storefront::services::{catalog, health};
use std::time::Duration;

async fn offline_api() -> ApiClient {
    ApiClient::new(&unreachable_url().await.unwrap(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_list_products_decodes_backend_shape() {
    let mock = MockBackend::start().await.unwrap();
    let products = catalog::list_products(&mock.api().unwrap()).await;

    assert_eq!(products.len(), 5);
    assert_eq!(products[0].categories[0].name, "Sándwiches");
    assert_eq!(products[0].first_image(), Some("https://cdn.saboryfuego.cl/completo.jpg"));
    assert!(products[3].categories.is_empty());
    assert_eq!(products[4].unit_price(), Price::ZERO);
}

#[tokio::test]
async fn test_lists_degrade_to_empty_when_offline() {
    let api = offline_api().await;
    assert!(catalog::list_products(&api).await.is_empty());
    assert!(catalog::list_users(&api).await.is_empty());
}

#[tokio::test]
async fn test_product_detail_direct() {
    let mock = MockBackend::start().await.unwrap();
    let product = catalog::product_detail(&mock.api().unwrap(), ProductId::new(2))
        .await
        .unwrap();
    assert_eq!(product.name, "Churrasco");

    let paths: Vec<_> = mock.requests().await.into_iter().map(|r| r.path).collect();
    assert_eq!(paths, ["/products/2"]);
}

#[tokio::test]
async fn test_product_detail_falls_back_to_list_scan() {
    let mock = MockBackend::with_options(MockOptions {
        product_lookup: ProductLookup::Failing,
        ..MockOptions::default()
    })
    .await
    .unwrap();
    let api = mock.api().unwrap();

    let product = catalog::product_detail(&api, ProductId::new(3)).await.unwrap();
    assert_eq!(product.name, "Pastel de Choclo");

    assert!(catalog::product_detail(&api, ProductId::new(42)).await.is_none());

    let paths: Vec<_> = mock.requests().await.into_iter().map(|r| r.path).collect();
    assert_eq!(paths, ["/products/3", "/products", "/products/42", "/products"]);
}

#[tokio::test]
async fn test_product_detail_none_when_offline() {
    assert!(catalog::product_detail(&offline_api().await, ProductId::new(1)).await.is_none());
}

#[tokio::test]
async fn test_offers_from_backend_catalog() {
    let mock = MockBackend::start().await.unwrap();
    let products = catalog::list_products(&mock.api().unwrap()).await;

    let offers = project_discounts(&products);
    let names: Vec<_> = offers.iter().map(|o| o.product.name.as_str()).collect();
    assert_eq!(names, ["Completo Italiano", "Pastel de Choclo", "Sopaipillas"]);
    assert_eq!(offers[0].final_price, Price::from(2700));
    assert_eq!(offers[1].final_price, Price::from(7425));
    assert_eq!(offers[2].final_price, Price::ZERO);

    assert_eq!(catalog::hero_offers(&products).len(), 3);
}

#[tokio::test]
async fn test_users_listing() {
    let mock = MockBackend::start().await.unwrap();
    let users = catalog::list_users(&mock.api().unwrap()).await;

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].edad, Some(31));
    assert_eq!(users[1].edad, None);
}

#[tokio::test]
async fn test_health_online_and_offline() {
    let mock = MockBackend::start().await.unwrap();
    assert_eq!(health::check(&mock.api().unwrap()).await, ApiStatus::Online);

    let down = MockBackend::with_options(MockOptions {
        healthy: false,
        ..MockOptions::default()
    })
    .await
    .unwrap();
    assert_eq!(health::check(&down.api().unwrap()).await, ApiStatus::Offline);

    assert_eq!(health::check(&offline_api().await).await, ApiStatus::Offline);
}
