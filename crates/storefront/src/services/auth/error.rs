//! Authentication error types.

use std::fmt;

use thiserror::Error;

use sabor_core::StorageError;

/// Default banner when a sign-in fails without a backend message.
pub const LOGIN_FAILED: &str = "Error al iniciar sesión. Intenta de nuevo.";

/// Default banner when a registration fails without a backend message.
pub const REGISTER_FAILED: &str = "Error al registrar usuario. Intenta de nuevo.";

/// Errors that can occur during authentication flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more form fields are invalid; nothing was sent.
    #[error("{0}")]
    InvalidForm(FormErrors),

    /// The backend refused the request. Carries the banner message.
    #[error("{0}")]
    Rejected(String),

    /// Sign-out could not clear client storage.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<&'static str>,
    pub correo: Option<&'static str>,
    pub password: Option<&'static str>,
    pub confirm: Option<&'static str>,
}

impl FormErrors {
    /// Whether every field passed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.correo.is_none()
            && self.password.is_none()
            && self.confirm.is_none()
    }

    /// Field messages in form order.
    pub fn messages(&self) -> impl Iterator<Item = &'static str> {
        [self.name, self.correo, self.password, self.confirm]
            .into_iter()
            .flatten()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self.messages().collect();
        write!(f, "{}", messages.join("; "))
    }
}
