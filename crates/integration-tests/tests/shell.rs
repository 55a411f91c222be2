//! The interactive shell driven by scripted input against the mock backend.

#![allow(clippy::unwrap_used)]

use sabor_integration_tests::{MockBackend, USER_CORREO, USER_PASSWORD, unreachable_url};
use sabor_storefront::api::ApiClient;
use sabor_storefront::shell::{Command, PASSWORD_PROMPT, ProductsArgs, Shell};
use sabor_storefront::state::AppState;
use sabor_storefront::storage::FileStorage;
use std::time::Duration;
use tempfile::TempDir;

fn shell(api: ApiClient, dir: &TempDir) -> Shell {
    Shell::new(AppState::new(api, FileStorage::new(dir.path().join("storage.json"))))
}

async fn run(shell: &mut Shell, script: &str) -> String {
    let mut output = Vec::new();
    shell.run(script.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn test_browse_catalog() {
    let mock = MockBackend::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let mut shell = shell(mock.api().unwrap(), &dir);

    let output = run(
        &mut shell,
        "products --category sandwiches\nproduct 99\nmenu\noffers\nusers\nhealth\n",
    )
    .await;

    assert!(output.contains("Productos (2 de 5)"));
    assert!(output.contains("Producto no encontrado."));
    assert!(output.contains("== Otros =="));
    assert!(output.contains("== Platos de fondo =="));
    assert!(output.contains("el producto es gratis"));
    assert!(output.contains("Ana Rojas (31) ana@saboryfuego.cl"));
    assert!(output.contains("API ● online"));
}

#[tokio::test]
async fn test_cart_session() {
    let mock = MockBackend::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let mut shell = shell(mock.api().unwrap(), &dir);

    let output = run(&mut shell, "add 1\nadd 1 2\nadd 2\nqty 2 0\nremove 2\nadd 77\n").await;
    assert!(output.contains("Completo Italiano x3"));
    assert!(output.contains("La cantidad debe ser al menos 1."));
    assert!(output.contains("No encontrado: producto 77"));

    let cart = shell.state().cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.total_quantity(), 3);
    assert!(cart.is_open());
}

#[tokio::test]
async fn test_sign_in_then_operate_register() {
    let mock = MockBackend::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let mut shell = shell(mock.api().unwrap(), &dir);

    let script = format!(
        "ring 1\nlogin --correo {USER_CORREO} --remember\n{USER_PASSWORD}\nwhoami\nring 1\nring 2\ncheckout\nlogout\nring 1\n"
    );
    let output = run(&mut shell, &script).await;

    assert!(output.contains(PASSWORD_PROMPT));
    assert!(output.contains("Bienvenido, Camila. Continúa en /cashierPage"));
    assert!(output.contains("Camila <camila@saboryfuego.cl> (cajero)"));
    assert!(output.contains("Venta #101 procesada"));
    assert!(output.contains("Total: $24.40"));
    assert!(output.contains("Sesión cerrada. Continúa en /login"));
    assert_eq!(output.matches("Acceso denegado").count(), 2);
}

#[tokio::test]
async fn test_one_shot_products_offline() {
    let dir = TempDir::new().unwrap();
    let api = ApiClient::new(&unreachable_url().await.unwrap(), Duration::from_secs(2)).unwrap();
    let mut shell = shell(api, &dir);

    let text = shell
        .execute(Command::Products(ProductsArgs::default()))
        .await
        .unwrap();
    assert!(text.starts_with("Productos (0 de 0)"));

    let text = shell.execute(Command::Health).await.unwrap();
    assert_eq!(text, "API ○ offline");
}

#[tokio::test]
async fn test_visitor_choice_hides_welcome() {
    let mock = MockBackend::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let mut shell = shell(mock.api().unwrap(), &dir);

    let output = run(&mut shell, "visit\n").await;
    assert!(output.contains("Entrar como visita"));
    assert!(output.contains("Pastel de Choclo"));

    let output = run(&mut shell, "exit\n").await;
    assert!(!output.contains("Entrar como visita"));
}
