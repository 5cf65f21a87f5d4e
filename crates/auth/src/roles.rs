use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockmaster_core::DomainError;

/// RBAC role.
///
/// The role set is closed: StockMaster has exactly three roles, and each
/// non-superadmin role is tied to an assigned location.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access across all locations and all entity administration.
    Superadmin,
    /// Scoped to one godown (warehouse) plus the Unassigned pool.
    Godownadmin,
    /// Scoped to one shop plus the Unassigned pool.
    Shopadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Godownadmin => "godownadmin",
            Role::Shopadmin => "shopadmin",
        }
    }

    /// Whether this role must carry an assigned location.
    pub fn requires_location(&self) -> bool {
        !matches!(self, Role::Superadmin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Role::Superadmin),
            "godownadmin" => Ok(Role::Godownadmin),
            "shopadmin" => Ok(Role::Shopadmin),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}
