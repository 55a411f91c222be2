//! Integration tests for the Sabor storefront client.
//!
//! [`MockBackend`] serves the backend's HTTP contract from an axum router on
//! an ephemeral local port and records every request the client sends, so the
//! tests under `tests/` can drive the real gateway client, services and shell
//! end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sabor-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

use sabor_storefront::api::{ApiClient, ApiError};

/// Error type for test scaffolding.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Credentials the mock accepts.
pub const USER_CORREO: &str = "camila@saboryfuego.cl";
pub const USER_PASSWORD: &str = "secreto1";
/// Token issued on a successful sign-in.
pub const USER_TOKEN: &str = "tok-camila-7f3a";
/// Rejected message for bad credentials.
pub const BAD_CREDENTIALS: &str = "Credenciales inválidas";
/// A second account whose sign-in issues no bearer token.
pub const WAITER_CORREO: &str = "diego@saboryfuego.cl";
/// An address for which sign-in and registration fail with a JSON body that
/// carries no `error` field.
pub const SILENT_CORREO: &str = "sin-mensaje@saboryfuego.cl";
/// An address registration refuses as taken.
pub const TAKEN_CORREO: &str = "ocupado@saboryfuego.cl";
pub const TAKEN_MESSAGE: &str = "El correo ya está registrado";

// =============================================================================
// Options
// =============================================================================

/// How `GET /products/{id}` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductLookup {
    /// Serve the product, or 404 if unknown.
    #[default]
    Direct,
    /// Always 500 with an HTML body.
    Failing,
}

/// Mock behavior.
#[derive(Debug, Clone, Copy)]
pub struct MockOptions {
    pub product_lookup: ProductLookup,
    /// `GET /health` succeeds.
    pub healthy: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            product_lookup: ProductLookup::Direct,
            healthy: true,
        }
    }
}

// =============================================================================
// Recording
// =============================================================================

/// A request as the mock received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    /// A header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone, Default)]
struct Shared {
    options: MockOptions,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    registrations: Arc<Mutex<Vec<Value>>>,
}

// =============================================================================
// Server
// =============================================================================

/// A running mock backend. Stops when dropped.
pub struct MockBackend {
    url: Url,
    shared: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a mock with default behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> Result<Self, BoxError> {
        Self::with_options(MockOptions::default()).await
    }

    /// Start a mock with the given behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn with_options(options: MockOptions) -> Result<Self, BoxError> {
        let shared = Shared {
            options,
            ..Shared::default()
        };

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = base_url(listener.local_addr()?)?;
        let app = router(shared.clone());
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "Mock backend stopped");
            }
        });

        Ok(Self { url, shared, server })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// A gateway client pointed at this mock.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn api(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(&self.url, Duration::from_secs(5))
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().await.clone()
    }

    /// Bodies posted to `/users/register`, oldest first.
    pub async fn registrations(&self) -> Vec<Value> {
        self.shared.registrations.lock().await.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A base URL on which nothing listens.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn unreachable_url() -> Result<Url, BoxError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    base_url(addr)
}

fn base_url(addr: SocketAddr) -> Result<Url, BoxError> {
    Ok(Url::parse(&format!("http://{addr}"))?)
}

fn router(shared: Shared) -> Router {
    Router::new()
        .route("/products", get(products))
        .route("/products/{id}", get(product))
        .route("/users", get(users))
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .route("/health", get(health))
        .route("/session", delete(no_content))
        .route("/opaque-error", get(opaque_error))
        .layer(middleware::from_fn_with_state(shared.clone(), record))
        .with_state(shared)
}

// =============================================================================
// Handlers
// =============================================================================

async fn record(State(shared): State<Shared>, request: Request, next: Next) -> Response {
    shared.requests.lock().await.push(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        headers: request.headers().clone(),
    });
    next.run(request).await
}

/// The catalog the mock serves.
#[must_use]
pub fn catalog() -> Value {
    json!([
        {
            "id": 1, "nombre": "Completo Italiano", "price": 3000, "discount": 10,
            "categorias": [{ "id": 1, "vch_nombre": "Sándwiches" }],
            "imagenes": [{ "id": 1, "url_image": "https://cdn.saboryfuego.cl/completo.jpg" }]
        },
        {
            "id": 2, "nombre": "Churrasco", "price": 8500,
            "categorias": [{ "id": 1, "vch_nombre": "Sándwiches" }]
        },
        {
            "id": 3, "nombre": "Pastel de Choclo", "price": 9900, "discount": 25,
            "descriptions": "Receta de la casa",
            "categorias": [{ "id": 2, "vch_nombre": "Platos de fondo" }]
        },
        { "id": 4, "nombre": "Mote con Huesillo", "price": 2500, "discount": 0, "categorias": null },
        { "id": 5, "nombre": "Sopaipillas", "price": null, "discount": 5 }
    ])
}

async fn products() -> Json<Value> {
    Json(catalog())
}

async fn product(State(shared): State<Shared>, Path(id): Path<i64>) -> Response {
    if shared.options.product_lookup == ProductLookup::Failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "<html>upstream error</html>").into_response();
    }

    let found = catalog()
        .as_array()
        .and_then(|products| {
            products
                .iter()
                .find(|p| p.get("id").and_then(Value::as_i64) == Some(id))
                .cloned()
        });

    match found {
        Some(product) => Json(product).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Producto no encontrado" })),
        )
            .into_response(),
    }
}

async fn users() -> Json<Value> {
    Json(json!([
        { "id": 1, "nombre": "Ana Rojas", "email": "ana@saboryfuego.cl", "edad": 31 },
        { "id": 2, "nombre": "Pedro Soto", "email": "pedro@saboryfuego.cl" }
    ]))
}

async fn login(Json(body): Json<Value>) -> Response {
    let correo = body.get("correo").and_then(Value::as_str);
    let password = body.get("contraseña").and_then(Value::as_str);

    if correo == Some(SILENT_CORREO) {
        return silent_failure();
    }

    if correo == Some(USER_CORREO) && password == Some(USER_PASSWORD) {
        Json(json!({
            "message": "Inicio de sesión exitoso",
            "user": { "id": 7, "name": "Camila", "correo": USER_CORREO, "rol": "cajero" },
            "token": USER_TOKEN
        }))
        .into_response()
    } else if correo == Some(WAITER_CORREO) && password == Some(USER_PASSWORD) {
        Json(json!({
            "message": "Inicio de sesión exitoso",
            "user": { "id": 8, "name": "Diego", "correo": WAITER_CORREO, "rol": "mesero" }
        }))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": BAD_CREDENTIALS }))).into_response()
    }
}

async fn register(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let correo = body.get("correo").and_then(Value::as_str).map(str::to_owned);
    shared.registrations.lock().await.push(body);

    if correo.as_deref() == Some(SILENT_CORREO) {
        silent_failure()
    } else if correo.as_deref() == Some(TAKEN_CORREO) {
        (StatusCode::CONFLICT, Json(json!({ "error": TAKEN_MESSAGE }))).into_response()
    } else {
        (
            StatusCode::CREATED,
            Json(json!({ "message": "Usuario registrado con éxito" })),
        )
            .into_response()
    }
}

fn silent_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "fallo interno" })),
    )
        .into_response()
}

async fn health(State(shared): State<Shared>) -> Response {
    if shared.options.healthy {
        Json(json!({ "status": "ok" })).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response()
    }
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn opaque_error() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": "sin campo error" }))).into_response()
}
