use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, Entity, ProductId};

/// Catalog product.
///
/// # Invariants
/// - `sku` is non-blank and unique across the catalog (uniqueness is enforced
///   by the store).
/// - `price` and `cost_price` are non-negative integer cents.
/// - A product exists only while at least one inventory record references it;
///   the store removes orphaned products during inventory deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub category: String,
    /// Selling price in integer cents.
    pub price: i64,
    /// Acquisition cost in integer cents.
    pub cost_price: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: i64,
    pub cost_price: i64,
}

/// Field changes applied by product edit flows.
///
/// Inventory edit flows reuse this to sync denormalized display fields back
/// to the product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub cost_price: Option<i64>,
    pub active: Option<bool>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Product {
    pub fn create(new: NewProduct, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let sku = new.sku.trim().to_string();
        if sku.is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if new.price < 0 || new.cost_price < 0 {
            return Err(DomainError::validation("prices cannot be negative"));
        }

        Ok(Self {
            id: ProductId::new(),
            name,
            sku,
            category: new.category.trim().to_string(),
            price: new.price,
            cost_price: new.cost_price,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply edit-flow changes. The SKU is identity-bearing and never changes.
    pub fn apply(
        &mut self,
        changes: ProductChanges,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(category) = changes.category {
            self.category = category.trim().to_string();
        }
        if let Some(price) = changes.price {
            if price < 0 {
                return Err(DomainError::validation("price cannot be negative"));
            }
            self.price = price;
        }
        if let Some(cost_price) = changes.cost_price {
            if cost_price < 0 {
                return Err(DomainError::validation("cost price cannot be negative"));
            }
            self.cost_price = cost_price;
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Basmati Rice 5kg".to_string(),
            sku: "RICE-5KG".to_string(),
            category: "Grains".to_string(),
            price: 1299,
            cost_price: 950,
        }
    }

    #[test]
    fn create_trims_and_defaults_active() {
        let mut input = new_product();
        input.name = "  Basmati Rice 5kg  ".to_string();
        let product = Product::create(input, Utc::now()).unwrap();
        assert_eq!(product.name, "Basmati Rice 5kg");
        assert!(product.active);
    }

    #[test]
    fn create_rejects_blank_sku() {
        let mut input = new_product();
        input.sku = "   ".to_string();
        let err = Product::create(input, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_negative_price() {
        let mut input = new_product();
        input.price = -1;
        let err = Product::create(input, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn apply_syncs_edit_fields() {
        let mut product = Product::create(new_product(), Utc::now()).unwrap();
        product
            .apply(
                ProductChanges {
                    name: Some("Basmati Rice 10kg".to_string()),
                    price: Some(2399),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(product.name, "Basmati Rice 10kg");
        assert_eq!(product.price, 2399);
        // Untouched fields survive.
        assert_eq!(product.sku, "RICE-5KG");
        assert_eq!(product.cost_price, 950);
    }

    #[test]
    fn apply_rejects_negative_cost_price() {
        let mut product = Product::create(new_product(), Utc::now()).unwrap();
        let err = product
            .apply(
                ProductChanges {
                    cost_price: Some(-10),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
