//! User entity for identity administration.
//!
//! Users are plain records managed by superadmins; authentication tokens are
//! issued elsewhere and only *validated* by this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, Entity, UserId};

use crate::Role;

/// A StockMaster user.
///
/// # Invariants
/// - `email` is non-blank and contains '@'.
/// - godownadmin/shopadmin users always carry an assigned location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub location: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub location: Option<String>,
}

/// Field changes applied by `PUT /users/:id`.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub location: Option<Option<String>>,
    pub active: Option<bool>,
}

impl User {
    pub fn create(new: NewUser, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let email = new.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("email must be a valid address"));
        }
        let display_name = new.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(DomainError::validation("display_name cannot be empty"));
        }
        let location = normalize_location(new.role, new.location)?;

        Ok(Self {
            id: UserId::new(),
            email,
            display_name,
            role: new.role,
            location,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, changes: UserChanges, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(email) = changes.email {
            let email = email.trim().to_string();
            if email.is_empty() || !email.contains('@') {
                return Err(DomainError::validation("email must be a valid address"));
            }
            self.email = email;
        }
        if let Some(name) = changes.display_name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("display_name cannot be empty"));
            }
            self.display_name = name;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(location) = changes.location {
            self.location = location;
        }
        // Role/location consistency is re-checked after both may have changed.
        self.location = normalize_location(self.role, self.location.take())?;
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = now;
        Ok(())
    }
}

fn normalize_location(
    role: Role,
    location: Option<String>,
) -> Result<Option<String>, DomainError> {
    let location = location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    if role.requires_location() && location.is_none() {
        return Err(DomainError::validation(format!(
            "role '{role}' requires an assigned location"
        )));
    }
    Ok(location)
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_superadmin_without_location() {
        let user = User::create(
            NewUser {
                email: "root@example.com".to_string(),
                display_name: "Root".to_string(),
                role: Role::Superadmin,
                location: None,
            },
            Utc::now(),
        )
        .unwrap();
        assert!(user.active);
        assert_eq!(user.location, None);
    }

    #[test]
    fn godownadmin_requires_location() {
        let err = User::create(
            NewUser {
                email: "g@example.com".to_string(),
                display_name: "G".to_string(),
                role: Role::Godownadmin,
                location: None,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn demoting_to_scoped_role_without_location_rejected() {
        let mut user = User::create(
            NewUser {
                email: "root@example.com".to_string(),
                display_name: "Root".to_string(),
                role: Role::Superadmin,
                location: None,
            },
            Utc::now(),
        )
        .unwrap();

        let err = user
            .apply(
                UserChanges {
                    role: Some(Role::Shopadmin),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn invalid_email_rejected() {
        let err = User::create(
            NewUser {
                email: "not-an-email".to_string(),
                display_name: "X".to_string(),
                role: Role::Superadmin,
                location: None,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
