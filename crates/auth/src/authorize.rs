use std::collections::HashSet;

use thiserror::Error;

use stockmaster_core::UserId;

use crate::{permissions, LocationScope, Permission, Role};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API derives it from validated token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub scope: LocationScope,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    #[error("forbidden: location '{0}' is outside the caller's scope")]
    LocationOutOfScope(String),
}

/// Role→permission mapping.
///
/// Superadmin holds the wildcard. Location admins can read the directory
/// entities and work inventory; entity administration stays superadmin-only.
pub fn permissions_for_role(role: Role) -> Vec<Permission> {
    match role {
        Role::Superadmin => vec![Permission::new("*")],
        Role::Godownadmin | Role::Shopadmin => vec![
            Permission::new(permissions::INVENTORY_READ),
            Permission::new(permissions::INVENTORY_WRITE),
            Permission::new(permissions::PRODUCTS_READ),
            Permission::new(permissions::GODOWNS_READ),
            Permission::new(permissions::SHOPS_READ),
        ],
    }
}

/// Authorize a principal for a required permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let granted = permissions_for_role(principal.role);
    let perms: HashSet<&str> = granted.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Authorize a principal to mutate stock at `location`.
///
/// `pool_name` is the caller-supplied name of the unassigned pool, which every
/// role may touch (moving stock in and out of the pool is exactly what
/// location admins are for).
pub fn authorize_location(
    principal: &Principal,
    location: &str,
    pool_name: &str,
) -> Result<(), AuthzError> {
    if location == pool_name || principal.scope.allows(location) {
        Ok(())
    } else {
        Err(AuthzError::LocationOutOfScope(location.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoped_principal(location: &str) -> Principal {
        Principal {
            user_id: UserId::new(),
            role: Role::Godownadmin,
            scope: LocationScope::Location(location.to_string()),
        }
    }

    #[test]
    fn superadmin_wildcard_grants_everything() {
        let p = Principal {
            user_id: UserId::new(),
            role: Role::Superadmin,
            scope: LocationScope::All,
        };
        assert!(authorize(&p, &Permission::new(permissions::USERS_MANAGE)).is_ok());
        assert!(authorize_location(&p, "Anywhere", "Unassigned").is_ok());
    }

    #[test]
    fn godownadmin_cannot_manage_users() {
        let p = scoped_principal("Central Godown");
        let err = authorize(&p, &Permission::new(permissions::USERS_MANAGE)).unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden(_)));
    }

    #[test]
    fn godownadmin_can_work_inventory_in_own_location() {
        let p = scoped_principal("Central Godown");
        assert!(authorize(&p, &Permission::new(permissions::INVENTORY_WRITE)).is_ok());
        assert!(authorize_location(&p, "Central Godown", "Unassigned").is_ok());
        assert!(authorize_location(&p, "Unassigned", "Unassigned").is_ok());
    }

    #[test]
    fn godownadmin_blocked_outside_own_location() {
        let p = scoped_principal("Central Godown");
        let err = authorize_location(&p, "North Shop", "Unassigned").unwrap_err();
        assert!(matches!(err, AuthzError::LocationOutOfScope(_)));
    }
}
