//! `stockmaster-auth` — pure authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{authorize, authorize_location, permissions_for_role, AuthzError, Principal};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256Jwt, JwtError, JwtValidator};
pub use permissions::Permission;
pub use principal::LocationScope;
pub use roles::Role;
pub use user::{NewUser, User, UserChanges};
