use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, Entity, GodownId};

/// Godown (warehouse) directory entry.
///
/// The `name` doubles as the location string on inventory records, so it is
/// unique across godowns and shops and never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Godown {
    pub id: GodownId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGodown {
    pub name: String,
    pub address: String,
    pub city: String,
}

#[derive(Debug, Clone, Default)]
pub struct GodownChanges {
    pub address: Option<String>,
    pub city: Option<String>,
}

impl Godown {
    pub fn create(new: NewGodown, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = validate_location_name(&new.name)?;
        Ok(Self {
            id: GodownId::new(),
            name,
            address: new.address.trim().to_string(),
            city: new.city.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// The name is identity-bearing (it is the location string on stock
    /// rows), so edits only touch descriptive fields.
    pub fn apply(&mut self, changes: GodownChanges, now: DateTime<Utc>) {
        if let Some(address) = changes.address {
            self.address = address.trim().to_string();
        }
        if let Some(city) = changes.city {
            self.city = city.trim().to_string();
        }
        self.updated_at = now;
    }
}

impl Entity for Godown {
    type Id = GodownId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Shared name rule for godowns and shops: non-blank, and never the reserved
/// pool sentinel.
pub(crate) fn validate_location_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if name == "Unassigned" {
        return Err(DomainError::validation(
            "'Unassigned' is reserved for the stock pool",
        ));
    }
    Ok(name)
}
