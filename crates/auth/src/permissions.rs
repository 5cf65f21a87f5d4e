use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier used for RBAC checks.
///
/// Permissions are opaque dotted strings at this layer; the role→permission
/// mapping lives in [`crate::authorize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const INVENTORY_READ: &str = "inventory.read";
pub const INVENTORY_WRITE: &str = "inventory.write";
pub const PRODUCTS_READ: &str = "products.read";
pub const PRODUCTS_WRITE: &str = "products.write";
pub const GODOWNS_READ: &str = "godowns.read";
pub const GODOWNS_WRITE: &str = "godowns.write";
pub const SHOPS_READ: &str = "shops.read";
pub const SHOPS_WRITE: &str = "shops.write";
pub const USERS_MANAGE: &str = "users.manage";
