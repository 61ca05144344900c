//! `storefront-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it validates
//! tokens into claims and answers pure policy questions. The ledger itself
//! stays auth-agnostic.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod roles;

pub use authorize::{authorize, permissions_from_roles, AuthzError, Principal};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use roles::Role;
