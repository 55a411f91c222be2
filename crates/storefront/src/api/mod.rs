//! Backend API gateway.
//!
//! A thin JSON-over-HTTP client for the restaurant backend. Every request
//! carries:
//!
//! - `Content-Type: application/json`
//! - `Cache-Control: no-store` and `Pragma: no-cache` (reads always hit the
//!   backend)
//! - `Authorization: Bearer <token>` once a token is known
//!
//! Non-success responses are turned into [`ApiError::Status`] carrying the
//! human-readable `error` field of the body, if any.
//!
//! # Example
//!
//! ```rust,ignore
//! use sabor_storefront::api::ApiClient;
//!
//! let client = ApiClient::from_config(&config)?;
//! let products = client.products().await?;
//! ```

mod types;

pub use types::{HealthStatus, LoginRequest, LoginResponse, RegisterRequest, UserSummary};

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue, PRAGMA};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use sabor_core::{Product, ProductId};

use crate::config::StorefrontConfig;

/// Message used when an error body is not JSON.
pub const UNKNOWN_ERROR: &str = "Error desconocido";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, TLS, body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {}", .error.as_deref().unwrap_or("(no error message)"))]
    Status { status: u16, error: Option<String> },

    /// A success body did not have the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Single resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The configured base URL cannot be used.
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// The backend's message, or `default` when there is none.
    #[must_use]
    pub fn message(&self, default: &str) -> String {
        match self {
            Self::Status { error: Some(message), .. } => message.clone(),
            _ => default.to_string(),
        }
    }

    /// Whether the backend reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Status { status: 404, .. })
    }
}

/// Client for the restaurant backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    token: Option<SecretString>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` for a base URL that cannot be a base, or
    /// `ApiError::Http` if the HTTP client fails to build.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ApiError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
            }),
            token: None,
        })
    }

    /// Create a client from configuration, including the configured token.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut client = Self::new(&config.api_url, config.http_timeout)?;
        client.token.clone_from(&config.api_token);
        Ok(client)
    }

    /// Replace the bearer token. `None` stops sending `Authorization`.
    pub fn set_token(&mut self, token: Option<SecretString>) {
        self.token = token;
    }

    /// Whether requests carry a bearer token.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Absolute URL for an API path such as `/products`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.inner.client.request(method, self.url(path));
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and decode the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = extract_error(&body);
            debug!(
                status = status.as_u16(),
                error = message.as_deref().unwrap_or(""),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                error: message,
            });
        }

        // 204 and friends: decode as JSON null
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };

        serde_json::from_str(body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Generic helpers
    // =========================================================================

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self, body))]
    pub async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self, body))]
    pub async fn put_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// `GET /products`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json("/products").await
    }

    /// `GET /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` on 404, otherwise any request error.
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_json(&format!("/products/{id}"))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ApiError::NotFound(format!("product {id}"))
                } else {
                    e
                }
            })
    }

    /// `POST /users/login`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's message on rejection.
    #[instrument(skip_all, fields(correo = %request.correo))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.post_json("/users/login", request).await
    }

    /// `POST /users/register`. Returns the backend's message, if any.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's message on rejection.
    #[instrument(skip_all, fields(correo = %request.correo))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<String>, ApiError> {
        let body: serde_json::Value = self.post_json("/users/register", request).await?;
        Ok(body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string))
    }

    /// `GET /users`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn users(&self) -> Result<Vec<UserSummary>, ApiError> {
        self.get_json("/users").await
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success or transport failure.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health").await
    }
}

/// The `error` field of a non-success body.
///
/// A body that is not JSON yields [`UNKNOWN_ERROR`]; JSON without a string
/// `error` field yields `None`.
fn extract_error(body: &str) -> Option<String> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        Err(_) => Some(UNKNOWN_ERROR.to_string()),
    }
}
