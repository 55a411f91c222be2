//! Staff and customer roles.

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated identity.
///
/// The backend speaks Spanish role names (`cajero`, `cocina`, ...). Any role
/// string this client does not know is treated as a regular [`Role::Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "cajero")]
    Cashier,
    #[serde(rename = "cocina")]
    Kitchen,
    #[serde(rename = "mesero")]
    Waiter,
    #[default]
    #[serde(rename = "cliente", other)]
    Client,
}

impl Role {
    /// The backend's wire name for this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Cashier => "cajero",
            Self::Kitchen => "cocina",
            Self::Waiter => "mesero",
            Self::Client => "cliente",
        }
    }

    /// Route a user with this role lands on after signing in.
    #[must_use]
    pub const fn landing_route(&self) -> &'static str {
        match self {
            Self::Cashier => "/cashierPage",
            Self::Kitchen => "/kitchen",
            Self::Waiter => "/tables",
            Self::Admin | Self::Client => "/",
        }
    }

    /// Whether this role may operate the cashier register.
    #[must_use]
    pub const fn can_operate_register(&self) -> bool {
        matches!(self, Self::Admin | Self::Cashier)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "cajero" => Ok(Self::Cashier),
            "cocina" => Ok(Self::Kitchen),
            "mesero" => Ok(Self::Waiter),
            "cliente" => Ok(Self::Client),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Cashier).unwrap(), "\"cajero\"");
        let role: Role = serde_json::from_str("\"mesero\"").unwrap();
        assert_eq!(role, Role::Waiter);
    }

    #[test]
    fn test_unknown_role_is_client() {
        let role: Role = serde_json::from_str("\"visita\"").unwrap();
        assert_eq!(role, Role::Client);
        assert!("visita".parse::<Role>().is_err());
    }

    #[test]
    fn test_landing_routes() {
        assert_eq!(Role::Admin.landing_route(), "/");
        assert_eq!(Role::Cashier.landing_route(), "/cashierPage");
        assert_eq!(Role::Kitchen.landing_route(), "/kitchen");
        assert_eq!(Role::Waiter.landing_route(), "/tables");
        assert_eq!(Role::Client.landing_route(), "/");
    }

    #[test]
    fn test_register_access() {
        assert!(Role::Admin.can_operate_register());
        assert!(Role::Cashier.can_operate_register());
        assert!(!Role::Waiter.can_operate_register());
        assert!(!Role::Client.can_operate_register());
    }
}
