//! Request and response bodies of the backend API.

use serde::{Deserialize, Serialize};

use sabor_core::{Identity, Role, UserId};

/// `POST /users/login` body.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub correo: String,
    #[serde(rename = "contraseña")]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("correo", &self.correo)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// `POST /users/login` success body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: Identity,
    /// Bearer token for later requests, when the backend issues one.
    #[serde(default)]
    pub token: Option<String>,
}

/// `POST /users/register` body. Self-registration always creates clients.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub correo: String,
    #[serde(rename = "contraseña")]
    pub password: String,
    pub rol: Role,
}

impl RegisterRequest {
    #[must_use]
    pub fn client(name: &str, correo: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            correo: correo.to_string(),
            password: password.to_string(),
            rol: Role::Client,
        }
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("correo", &self.correo)
            .field("password", &"[REDACTED]")
            .field("rol", &self.rol)
            .finish()
    }
}

/// Entry of `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub nombre: String,
    pub email: String,
    #[serde(default)]
    pub edad: Option<u32>,
}

/// `GET /health` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}
