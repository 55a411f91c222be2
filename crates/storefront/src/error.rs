//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for everything a command can fail
//! with. Commands return `Result<T, AppError>`; the shell and the binary
//! report the error through [`AppError::report`] and keep going (shell) or
//! exit non-zero (one-shot commands).

use thiserror::Error;

use sabor_core::pos::PosError;
use sabor_core::{CartError, StorageError};

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Sign-in or registration failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Client storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart operation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Point-of-sale operation rejected.
    #[error("POS error: {0}")]
    Pos(#[from] PosError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The signed-in identity may not do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed command input.
    #[error("Bad input: {0}")]
    BadInput(String),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether the error points at a defect or broken environment rather
    /// than at user input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Storage(_) | Self::Io(_) | Self::Api(ApiError::Parse(_) | ApiError::Url(_))
        )
    }

    /// Message suitable for the terminal. Internal details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => format!("Configuración inválida: {err}"),
            Self::Api(err) => err.message("No se pudo contactar al servidor."),
            Self::Auth(err) => err.to_string(),
            Self::Storage(_) | Self::Io(_) => "Error interno. Intenta de nuevo.".to_string(),
            Self::Cart(CartError::InvalidQuantity(_)) => "La cantidad debe ser al menos 1.".to_string(),
            Self::Pos(err) => err.to_string(),
            Self::NotFound(what) => format!("No encontrado: {what}"),
            Self::Forbidden(what) => format!("Acceso denegado: {what}"),
            Self::BadInput(msg) => msg.clone(),
        }
    }

    /// Log the error, capturing internal errors to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::debug!(error = %self, "Command rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("key", "product:12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("producto 12".to_string());
        assert_eq!(err.to_string(), "Not found: producto 12");

        let err = AppError::BadInput("cantidad inválida".to_string());
        assert_eq!(err.to_string(), "Bad input: cantidad inválida");
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AppError::Cart(CartError::InvalidQuantity(0)).user_message(),
            "La cantidad debe ser al menos 1."
        );
        assert_eq!(
            AppError::Pos(PosError::EmptyOrder).user_message(),
            "El pedido está vacío. Agregue productos."
        );
        assert_eq!(
            AppError::Api(ApiError::Status {
                status: 500,
                error: Some("Base de datos caída".to_string())
            })
            .user_message(),
            "Base de datos caída"
        );
        assert_eq!(
            AppError::Storage(StorageError::backend(std::io::Error::other("disk"))).user_message(),
            "Error interno. Intenta de nuevo."
        );
    }

    #[test]
    fn test_internal_classification() {
        assert!(AppError::Io(std::io::Error::other("tty")).is_internal());
        assert!(!AppError::NotFound("x".to_string()).is_internal());
        assert!(!AppError::Api(ApiError::NotFound("x".to_string())).is_internal());
    }
}
