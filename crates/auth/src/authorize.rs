use std::collections::HashSet;

use thiserror::Error;

use storefront_core::UserId;

use crate::{Permission, Role};

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from transport: the API layer derives this from
/// validated claims plus the role→permission policy below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Resolve a principal from claims-level identity and roles.
    pub fn resolve(user_id: UserId, roles: Vec<Role>) -> Self {
        let permissions = permissions_from_roles(&roles);
        Self {
            user_id,
            roles,
            permissions,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal for one required permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Role→permission mapping for the wallet surface.
///
/// Convention: "admin" grants everything; every authenticated principal may
/// read their own wallet and submit top-ups.
pub fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(Role::is_admin) {
        return vec![Permission::new("*")];
    }

    vec![Permission::new("wallet.read"), Permission::new("wallet.topup")]
}
