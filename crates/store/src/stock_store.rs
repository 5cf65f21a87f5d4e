use async_trait::async_trait;

use stockmaster_auth::{NewUser, User, UserChanges};
use stockmaster_core::{GodownId, ProductId, RecordId, ShopId, UserId};
use stockmaster_inventory::{InventoryRecord, Location, NewStockEntry, RecordChanges};
use stockmaster_locations::{
    Godown, GodownChanges, NewGodown, NewShop, Shop, ShopChanges,
};
use stockmaster_products::{NewProduct, Product, ProductChanges};

use crate::error::StoreError;

/// Result of a reassignment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassignOutcome {
    /// Destination equals the source location; nothing changed.
    Noop { record: InventoryRecord },
    /// Quantity moved. `source` is `None` when the move drained and removed
    /// the source row.
    Moved {
        moved: i64,
        source: Option<InventoryRecord>,
        destination: InventoryRecord,
    },
}

impl ReassignOutcome {
    /// The row now holding the moved stock (or the untouched row for no-ops).
    pub fn primary(&self) -> &InventoryRecord {
        match self {
            ReassignOutcome::Noop { record } => record,
            ReassignOutcome::Moved { destination, .. } => destination,
        }
    }
}

/// Result of a return-to-pool deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDeletion {
    /// Pool row that received the quantity, when one was created/merged.
    pub returned_to: Option<InventoryRecord>,
    /// True when the record was the product's last row and the product was
    /// removed too.
    pub product_removed: bool,
}

/// The record store consumed by the HTTP layer.
///
/// Every method that touches more than one row is atomic: it either fully
/// applies or leaves no observable change. Scope-based visibility filtering
/// is the API layer's job; the store only narrows by explicit criteria.
#[async_trait]
pub trait StockStore: Send + Sync {
    // ── inventory ────────────────────────────────────────────────────────

    /// List stock rows, optionally narrowed to one location name.
    async fn list_records(
        &self,
        location: Option<&Location>,
    ) -> Result<Vec<InventoryRecord>, StoreError>;

    async fn find_record(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError>;

    /// Create a stock entry: find-or-create the product by SKU, then
    /// merge-or-create the `(product, location)` row.
    async fn create_entry(&self, entry: NewStockEntry) -> Result<InventoryRecord, StoreError>;

    /// Plain field update (no movement). Product-level changes are synced to
    /// the catalog row and denormalized copies on sibling records. An
    /// explicit quantity correction to 0 deletes the row (zero-quantity rows
    /// are never persisted); the returned snapshot still reflects the
    /// requested state.
    async fn update_record(
        &self,
        id: RecordId,
        changes: RecordChanges,
        product_changes: ProductChanges,
    ) -> Result<InventoryRecord, StoreError>;

    /// Move `quantity` units of record `id` to `destination`.
    ///
    /// The source quantity is re-read under a row lock inside the
    /// transaction; `expected_quantity` is only compared against that fresh
    /// value and rejected with a conflict when stale — it never feeds the
    /// arithmetic.
    async fn reassign(
        &self,
        id: RecordId,
        destination: Location,
        quantity: i64,
        expected_quantity: Option<i64>,
    ) -> Result<ReassignOutcome, StoreError>;

    /// Delete a record, returning assigned quantity to the product's pool
    /// first, and removing the product itself when this was its last row.
    async fn delete_record(&self, id: RecordId) -> Result<RecordDeletion, StoreError>;

    // ── products ─────────────────────────────────────────────────────────

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError>;
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError>;

    /// Apply catalog changes and refresh denormalized copies on the
    /// product's records.
    async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, StoreError>;

    // ── godowns ──────────────────────────────────────────────────────────

    async fn list_godowns(&self) -> Result<Vec<Godown>, StoreError>;
    async fn find_godown(&self, id: GodownId) -> Result<Option<Godown>, StoreError>;
    async fn create_godown(&self, new: NewGodown) -> Result<Godown, StoreError>;
    async fn update_godown(
        &self,
        id: GodownId,
        changes: GodownChanges,
    ) -> Result<Godown, StoreError>;
    async fn delete_godown(&self, id: GodownId) -> Result<(), StoreError>;

    // ── shops ────────────────────────────────────────────────────────────

    async fn list_shops(&self) -> Result<Vec<Shop>, StoreError>;
    async fn find_shop(&self, id: ShopId) -> Result<Option<Shop>, StoreError>;
    async fn create_shop(&self, new: NewShop) -> Result<Shop, StoreError>;
    async fn update_shop(&self, id: ShopId, changes: ShopChanges) -> Result<Shop, StoreError>;
    async fn delete_shop(&self, id: ShopId) -> Result<(), StoreError>;

    // ── users ────────────────────────────────────────────────────────────

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, StoreError>;
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError>;
}
