use serde::{Deserialize, Serialize};

/// The slice of the location space a principal may mutate.
///
/// Derived from the role + assigned location in the token claims. The
/// `Unassigned` pool is not part of the scope itself; whether a scoped admin
/// may touch pool rows is an inventory policy decided at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationScope {
    /// Superadmin: every location.
    All,
    /// Location admin: exactly one named godown/shop.
    Location(String),
}

impl LocationScope {
    /// Whether `location` falls inside this scope.
    pub fn allows(&self, location: &str) -> bool {
        match self {
            LocationScope::All => true,
            LocationScope::Location(name) => name == location,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            LocationScope::All => None,
            LocationScope::Location(name) => Some(name),
        }
    }
}
