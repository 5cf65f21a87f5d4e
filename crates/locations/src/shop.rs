use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, Entity, ShopId};

use crate::godown::validate_location_name;

/// Shop directory entry. Mirrors [`crate::Godown`] but is a distinct entity
/// kind with its own admin role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewShop {
    pub name: String,
    pub address: String,
    pub city: String,
}

#[derive(Debug, Clone, Default)]
pub struct ShopChanges {
    pub address: Option<String>,
    pub city: Option<String>,
}

impl Shop {
    pub fn create(new: NewShop, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = validate_location_name(&new.name)?;
        Ok(Self {
            id: ShopId::new(),
            name,
            address: new.address.trim().to_string(),
            city: new.city.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, changes: ShopChanges, now: DateTime<Utc>) {
        if let Some(address) = changes.address {
            self.address = address.trim().to_string();
        }
        if let Some(city) = changes.city {
            self.city = city.trim().to_string();
        }
        self.updated_at = now;
    }
}

impl Entity for Shop {
    type Id = ShopId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_validates_name() {
        assert!(Shop::create(
            NewShop {
                name: "  ".to_string(),
                address: String::new(),
                city: String::new(),
            },
            Utc::now(),
        )
        .is_err());
    }
}
