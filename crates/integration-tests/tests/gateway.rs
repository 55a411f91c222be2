//! Gateway client against the mock backend: headers, error extraction and
//! response decoding.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use sabor_core::ProductId;
use sabor_integration_tests::{BAD_CREDENTIALS, MockBackend, USER_CORREO, unreachable_url};
use sabor_storefront::api::{ApiClient, ApiError, LoginRequest, UNKNOWN_ERROR};
use secrecy::SecretString;
use std::time::Duration;

#[tokio::test]
async fn test_every_request_disables_caching() {
    let mock = MockBackend::start().await.unwrap();
    let api = mock.api().unwrap();

    api.products().await.unwrap();
    api.health().await.unwrap();

    let requests = mock.requests().await;
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.header("cache-control"), Some("no-store"));
        assert_eq!(request.header("pragma"), Some("no-cache"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("authorization"), None);
    }
}

#[tokio::test]
async fn test_bearer_token_sent_when_set() {
    let mock = MockBackend::start().await.unwrap();
    let mut api = mock.api().unwrap();

    api.set_token(Some(SecretString::from("tok-123")));
    api.users().await.unwrap();
    api.set_token(None);
    api.users().await.unwrap();

    let requests = mock.requests().await;
    assert_eq!(requests[0].header("authorization"), Some("Bearer tok-123"));
    assert_eq!(requests[1].header("authorization"), None);
}

#[tokio::test]
async fn test_error_field_is_the_message() {
    let mock = MockBackend::start().await.unwrap();
    let api = mock.api().unwrap();

    let request = LoginRequest {
        correo: USER_CORREO.to_string(),
        password: "incorrecta".to_string(),
    };
    let err = api.login(&request).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 401, .. }));
    assert_eq!(err.message("por defecto"), BAD_CREDENTIALS);
}

#[tokio::test]
async fn test_json_without_error_field_uses_caller_default() {
    let mock = MockBackend::start().await.unwrap();
    let api = mock.api().unwrap();

    let err = api.get_json::<serde_json::Value>("/opaque-error").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, error: None }));
    assert_eq!(err.message("por defecto"), "por defecto");
}

#[tokio::test]
async fn test_unparsable_error_body_is_unknown_error() {
    let mock = MockBackend::with_options(sabor_integration_tests::MockOptions {
        product_lookup: sabor_integration_tests::ProductLookup::Failing,
        ..Default::default()
    })
    .await
    .unwrap();
    let api = mock.api().unwrap();

    let err = api.product(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.message("por defecto"), UNKNOWN_ERROR);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let mock = MockBackend::start().await.unwrap();
    let api = mock.api().unwrap();

    let err = api.product(ProductId::new(99)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert!(err.is_not_found());

    let product = api.product(ProductId::new(3)).await.unwrap();
    assert_eq!(product.name, "Pastel de Choclo");
    assert_eq!(product.description.as_deref(), Some("Receta de la casa"));
}

#[tokio::test]
async fn test_empty_success_body_decodes_as_null() {
    let mock = MockBackend::start().await.unwrap();
    let api = mock.api().unwrap();

    let body: serde_json::Value = api.delete_json("/session").await.unwrap();
    assert!(body.is_null());

    let unit: Option<()> = api.delete_json("/session").await.unwrap();
    assert!(unit.is_none());
}

#[tokio::test]
async fn test_transport_failure_is_http_error() {
    let url = unreachable_url().await.unwrap();
    let api = ApiClient::new(&url, Duration::from_secs(2)).unwrap();

    let err = api.products().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
    assert_eq!(err.message("Sin conexión"), "Sin conexión");
}
