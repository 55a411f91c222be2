//! The authenticated identity.

use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// The signed-in user, as returned by `POST /users/login` and as persisted
/// in client storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "rol", default)]
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[must_use]
    pub fn is_cashier(&self) -> bool {
        self.role == Role::Cashier
    }

    #[must_use]
    pub fn is_kitchen(&self) -> bool {
        self.role == Role::Kitchen
    }

    #[must_use]
    pub fn is_waiter(&self) -> bool {
        self.role == Role::Waiter
    }

    #[must_use]
    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }
}
