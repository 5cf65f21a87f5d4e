use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{DomainError, Entity, ProductId, RecordId};

/// Storage location of a stock row: a named godown/shop, or the per-product
/// pool of stock not yet allocated anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Location {
    Unassigned,
    Named(String),
}

impl Location {
    /// Wire/storage spelling of the pool sentinel.
    pub const UNASSIGNED: &'static str = "Unassigned";

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::validation("location cannot be empty"));
        }
        if s == Self::UNASSIGNED {
            Ok(Location::Unassigned)
        } else {
            Ok(Location::Named(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Location::Unassigned => Self::UNASSIGNED,
            Location::Named(name) => name,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Location::Unassigned)
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for Location {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Location::parse(&value)
    }
}

/// Stock level classification, derived from quantity vs minimum stock level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn derive(quantity: i64, minimum_stock_level: i64) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity <= minimum_stock_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(product, location)` stock row.
///
/// # Invariants
/// - `quantity >= 0`; rows that reach 0 are deleted, never persisted.
/// - At most one record exists per `(product_id, location)` pair; moves into
///   an occupied pair merge quantities instead of duplicating the row.
/// - `name`, `price` and `cost_price` are denormalized display copies of the
///   product, kept in sync by edit flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: RecordId,
    pub product_id: ProductId,
    pub location: Location,
    pub quantity: i64,
    pub minimum_stock_level: i64,
    pub unit: String,
    pub name: String,
    pub price: i64,
    pub cost_price: i64,
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn status(&self) -> StockStatus {
        StockStatus::derive(self.quantity, self.minimum_stock_level)
    }
}

impl Entity for InventoryRecord {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Validated input for `POST /inventory` (new stock entry).
///
/// The store resolves `sku` to an existing product or creates one, then
/// merges into an existing `(product, location)` row or creates it.
#[derive(Debug, Clone)]
pub struct NewStockEntry {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub location: Location,
    pub quantity: i64,
    pub minimum_stock_level: i64,
    pub unit: String,
    pub price: i64,
    pub cost_price: i64,
}

impl NewStockEntry {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if self.minimum_stock_level < 0 {
            return Err(DomainError::validation(
                "minimum stock level cannot be negative",
            ));
        }
        if self.price < 0 || self.cost_price < 0 {
            return Err(DomainError::validation("prices cannot be negative"));
        }
        Ok(())
    }
}

/// Plain field changes applied by `PUT /inventory/:id` when no reassignment
/// is requested. Product-level fields (name/price/category) travel separately
/// so they can be synced through the catalog.
#[derive(Debug, Clone, Default)]
pub struct RecordChanges {
    /// Absolute quantity correction (stock-take), not a movement.
    pub quantity: Option<i64>,
    pub minimum_stock_level: Option<i64>,
}

impl RecordChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(q) = self.quantity {
            if q < 0 {
                return Err(DomainError::validation("quantity cannot be negative"));
            }
        }
        if let Some(m) = self.minimum_stock_level {
            if m < 0 {
                return Err(DomainError::validation(
                    "minimum stock level cannot be negative",
                ));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.minimum_stock_level.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_parse_maps_sentinel() {
        assert_eq!(Location::parse("Unassigned").unwrap(), Location::Unassigned);
        assert_eq!(
            Location::parse(" Warehouse A ").unwrap(),
            Location::Named("Warehouse A".to_string())
        );
        assert!(Location::parse("   ").is_err());
    }

    #[test]
    fn status_derivation() {
        assert_eq!(StockStatus::derive(0, 5), StockStatus::OutOfStock);
        assert_eq!(StockStatus::derive(3, 5), StockStatus::LowStock);
        assert_eq!(StockStatus::derive(5, 5), StockStatus::LowStock);
        assert_eq!(StockStatus::derive(6, 5), StockStatus::InStock);
    }

    #[test]
    fn new_entry_rejects_negative_quantity() {
        let entry = NewStockEntry {
            name: "Widget".to_string(),
            sku: "W-1".to_string(),
            category: String::new(),
            location: Location::Unassigned,
            quantity: -1,
            minimum_stock_level: 0,
            unit: "pcs".to_string(),
            price: 0,
            cost_price: 0,
        };
        assert!(entry.validate().is_err());
    }
}
