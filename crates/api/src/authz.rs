//! API-side authorization guard.
//!
//! Enforces permissions at the route boundary (before any ledger operation
//! executes), keeping the domain and store auth-agnostic.

use storefront_auth::{authorize, AuthzError, Permission, Principal};

use crate::context::PrincipalContext;

/// Check one required permission in the current request context.
///
/// Intended to be called **before** touching the ledger service.
pub fn authorize_request(
    principal: &PrincipalContext,
    required: &Permission,
) -> Result<(), AuthzError> {
    let principal = Principal::resolve(principal.user_id(), principal.roles().to_vec());
    authorize(&principal, required)
}
