//! API-side authorization guards.
//!
//! These enforce permission and location-scope checks at the request
//! boundary, keeping domain crates and the store auth-agnostic.

use stockmaster_auth::{authorize, authorize_location, AuthzError, Permission};
use stockmaster_inventory::Location;

use crate::context::PrincipalContext;

/// Check a permission in the current request context.
pub fn require(principal: &PrincipalContext, permission: &str) -> Result<(), AuthzError> {
    authorize(
        &principal.principal(),
        &Permission::new(permission.to_string()),
    )
}

/// Check that the caller may mutate stock at `location`.
///
/// The Unassigned pool is accessible to every role: moving stock in and out
/// of the pool is exactly what location admins do.
pub fn require_location(
    principal: &PrincipalContext,
    location: &Location,
) -> Result<(), AuthzError> {
    authorize_location(
        &principal.principal(),
        location.as_str(),
        Location::UNASSIGNED,
    )
}

/// Whether the caller may see records at `location` in list/read responses.
pub fn can_view_location(principal: &PrincipalContext, location: &Location) -> bool {
    location.is_unassigned() || principal.scope().allows(location.as_str())
}
