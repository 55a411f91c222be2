//! Authentication service.
//!
//! Sign-in and registration against the backend, with client-side form
//! validation. The backend owns credentials; the client only keeps the
//! returned identity in its [`SessionStore`].

mod error;

pub use error::{AuthError, FormErrors, LOGIN_FAILED, REGISTER_FAILED};

use secrecy::SecretString;
use tracing::{info, warn};

use sabor_core::{Email, Identity, SessionStore, Storage};

use crate::api::{ApiClient, LoginRequest, RegisterRequest};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Where a signed-out user is sent.
pub const LOGIN_ROUTE: &str = "/login";

const EMAIL_REQUIRED: &str = "El correo es requerido";
const EMAIL_INVALID: &str = "Formato de correo inválido";
const PASSWORD_REQUIRED: &str = "La contraseña es requerida";
const PASSWORD_TOO_SHORT: &str = "La contraseña debe tener al menos 6 caracteres";
const NAME_REQUIRED: &str = "El nombre es requerido";
const CONFIRM_REQUIRED: &str = "Debes confirmar tu contraseña";
const CONFIRM_MISMATCH: &str = "Las contraseñas no coinciden";

// =============================================================================
// Forms
// =============================================================================

/// Sign-in form.
#[derive(Clone, Default)]
pub struct LoginForm {
    pub correo: String,
    pub password: String,
    /// Keep the session across restarts.
    pub remember: bool,
}

impl LoginForm {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field is invalid.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let errors = FormErrors {
            correo: validate_email(&self.correo),
            password: self.password.is_empty().then_some(PASSWORD_REQUIRED),
            ..FormErrors::default()
        };

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Registration form.
#[derive(Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub correo: String,
    pub password: String,
    pub confirm: String,
}

impl RegisterForm {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field is invalid.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let password = if self.password.is_empty() {
            Some(PASSWORD_REQUIRED)
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            Some(PASSWORD_TOO_SHORT)
        } else {
            None
        };

        let confirm = if self.confirm.is_empty() {
            Some(CONFIRM_REQUIRED)
        } else if self.confirm != self.password {
            Some(CONFIRM_MISMATCH)
        } else {
            None
        };

        let errors = FormErrors {
            name: self.name.trim().is_empty().then_some(NAME_REQUIRED),
            correo: validate_email(&self.correo),
            password,
            confirm,
        };

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("correo", &self.correo)
            .field("password", &"[REDACTED]")
            .field("remember", &self.remember)
            .finish()
    }
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("name", &self.name)
            .field("correo", &self.correo)
            .field("password", &"[REDACTED]")
            .field("confirm", &"[REDACTED]")
            .finish()
    }
}

fn validate_email(correo: &str) -> Option<&'static str> {
    if correo.trim().is_empty() {
        Some(EMAIL_REQUIRED)
    } else if Email::parse(correo).is_err() {
        Some(EMAIL_INVALID)
    } else {
        None
    }
}

// =============================================================================
// Flows
// =============================================================================

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub identity: Identity,
    /// Landing route for the identity's role.
    pub redirect: &'static str,
    /// Bearer token issued by the backend, if any.
    pub token: Option<SecretString>,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    /// The backend's confirmation message, if any.
    pub message: Option<String>,
    /// Registration always continues at the sign-in page.
    pub redirect: &'static str,
}

/// Validate, call `POST /users/login` and start the session.
///
/// A storage failure while persisting the identity is logged; the identity
/// stays active for this process.
///
/// # Errors
///
/// Returns `AuthError::InvalidForm` without contacting the backend, or
/// `AuthError::Rejected` with the backend's message (default
/// [`LOGIN_FAILED`]).
pub async fn login<D: Storage, S: Storage>(
    api: &ApiClient,
    session: &mut SessionStore<D, S>,
    form: &LoginForm,
) -> Result<LoginOutcome, AuthError> {
    form.validate().map_err(AuthError::InvalidForm)?;

    let request = LoginRequest {
        correo: form.correo.clone(),
        password: form.password.clone(),
    };
    let response = api.login(&request).await.map_err(|e| {
        info!(error = %e, "Sign-in rejected");
        AuthError::Rejected(e.message(LOGIN_FAILED))
    })?;

    let identity = response.user;
    if let Err(e) = session.login(identity.clone(), form.remember) {
        warn!(error = %e, "Failed to persist identity; session lasts for this process only");
    }

    let token = response.token.filter(|t| !t.is_empty());
    if let Some(token) = &token
        && let Err(e) = session.set_token(token, form.remember)
    {
        warn!(error = %e, "Failed to persist bearer token");
    }

    set_sentry_user(&identity.id, Some(identity.email.as_str()));
    add_breadcrumb("auth", "Signed in", Some(&[("role", identity.role.as_str())][..]));

    Ok(LoginOutcome {
        redirect: identity.role.landing_route(),
        token: token.map(SecretString::from),
        identity,
    })
}

/// Validate and call `POST /users/register` with the client role. Fields
/// are sent as typed.
///
/// # Errors
///
/// Returns `AuthError::InvalidForm` without contacting the backend, or
/// `AuthError::Rejected` with the backend's message (default
/// [`REGISTER_FAILED`]).
pub async fn register(api: &ApiClient, form: &RegisterForm) -> Result<RegisterOutcome, AuthError> {
    form.validate().map_err(AuthError::InvalidForm)?;

    let request = RegisterRequest::client(&form.name, &form.correo, &form.password);
    let message = api.register(&request).await.map_err(|e| {
        info!(error = %e, "Registration rejected");
        AuthError::Rejected(e.message(REGISTER_FAILED))
    })?;

    info!(correo = %form.correo, "Registered new client");

    Ok(RegisterOutcome {
        message,
        redirect: LOGIN_ROUTE,
    })
}

/// End the session and return the route to continue at.
///
/// # Errors
///
/// Returns `AuthError::Storage` if client storage could not be cleared; the
/// in-memory identity is gone regardless.
pub fn logout<D: Storage, S: Storage>(session: &mut SessionStore<D, S>) -> Result<&'static str, AuthError> {
    let result = session.logout();
    clear_sentry_user();
    add_breadcrumb("auth", "Signed out", None);
    result?;
    Ok(LOGIN_ROUTE)
}
