//! Staff modules menu.
//!
//! Which back-office screens a role may open. Administrators see every
//! module, cashiers the ones granted to them, everyone else none.

use sabor_core::Role;

/// One back-office screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffModule {
    pub name: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    /// Roles granted access besides administrators.
    pub roles: &'static [Role],
}

/// Every module, in menu order.
pub const MODULES: &[StaffModule] = &[
    StaffModule {
        name: "Caja",
        path: "/cashierPage",
        description: "Ventas rápidas y pedidos remotos",
        roles: &[Role::Admin, Role::Cashier],
    },
    StaffModule {
        name: "Menú",
        path: "/menu",
        description: "Productos agrupados por categoría",
        roles: &[Role::Admin, Role::Cashier],
    },
    StaffModule {
        name: "Productos",
        path: "/products",
        description: "Catálogo con filtros",
        roles: &[Role::Admin],
    },
    StaffModule {
        name: "Usuarios",
        path: "/usuarios",
        description: "Usuarios registrados",
        roles: &[Role::Admin],
    },
    StaffModule {
        name: "VIP",
        path: "/vip",
        description: "Clientes frecuentes",
        roles: &[Role::Admin],
    },
];

/// Modules the given role may open, in menu order.
#[must_use]
pub fn available_modules(role: Option<Role>) -> Vec<&'static StaffModule> {
    match role {
        Some(Role::Admin) => MODULES.iter().collect(),
        Some(Role::Cashier) => MODULES
            .iter()
            .filter(|m| m.roles.contains(&Role::Cashier))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(role: Option<Role>) -> Vec<&'static str> {
        available_modules(role).iter().map(|m| m.name).collect()
    }

    #[test]
    fn test_admin_sees_every_module() {
        assert_eq!(names(Some(Role::Admin)).len(), MODULES.len());
    }

    #[test]
    fn test_cashier_sees_granted_modules() {
        assert_eq!(names(Some(Role::Cashier)), ["Caja", "Menú"]);
    }

    #[test]
    fn test_other_roles_see_nothing() {
        for role in [None, Some(Role::Client), Some(Role::Waiter), Some(Role::Kitchen)] {
            assert!(names(role).is_empty());
        }
    }
}
