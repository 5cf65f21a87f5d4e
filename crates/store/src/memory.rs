//! In-memory stock store.
//!
//! Intended for tests/dev. A single `RwLock` over the whole state stands in
//! for the database transaction: every multi-row operation validates first,
//! then mutates under one write guard, so readers never observe a partial
//! move.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockmaster_auth::{NewUser, User, UserChanges};
use stockmaster_core::{DomainError, GodownId, ProductId, RecordId, ShopId, UserId};
use stockmaster_inventory::{
    plan_reassignment, plan_return_to_pool, DestinationStep, InventoryRecord, Location,
    NewStockEntry, RecordChanges, SourceStep,
};
use stockmaster_locations::{Godown, GodownChanges, NewGodown, NewShop, Shop, ShopChanges};
use stockmaster_products::{NewProduct, Product, ProductChanges};

use crate::error::StoreError;
use crate::stock_store::{ReassignOutcome, RecordDeletion, StockStore};

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    records: HashMap<RecordId, InventoryRecord>,
    godowns: HashMap<GodownId, Godown>,
    shops: HashMap<ShopId, Shop>,
    users: HashMap<UserId, User>,
}

impl State {
    fn record_at(&self, product_id: ProductId, location: &Location) -> Option<&InventoryRecord> {
        self.records
            .values()
            .find(|r| r.product_id == product_id && r.location == *location)
    }

    fn location_name_taken(&self, name: &str) -> bool {
        self.godowns.values().any(|g| g.name == name)
            || self.shops.values().any(|s| s.name == name)
    }

    /// Refresh denormalized display fields on every record of `product`.
    fn sync_denormalized(&mut self, product: &Product) {
        for record in self
            .records
            .values_mut()
            .filter(|r| r.product_id == product.id)
        {
            record.name = product.name.clone();
            record.price = product.price;
            record.cost_price = product.cost_price;
        }
    }

    /// Drop the product row once its last record is gone.
    fn remove_product_if_orphaned(&mut self, product_id: ProductId) -> bool {
        let has_records = self.records.values().any(|r| r.product_id == product_id);
        if !has_records {
            self.products.remove(&product_id);
            return true;
        }
        false
    }
}

/// In-memory [`StockStore`] backend.
#[derive(Debug, Default)]
pub struct MemoryStockStore {
    state: RwLock<State>,
    // Test seam: simulate a storage failure between the source-side and
    // destination-side writes of a reassignment.
    fail_destination_write: AtomicBool,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn fail_next_destination_write(&self) {
        self.fail_destination_write.store(true, Ordering::SeqCst);
    }

    fn destination_write_fails(&self) -> bool {
        self.fail_destination_write.swap(false, Ordering::SeqCst)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn list_records(
        &self,
        location: Option<&Location>,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        let state = self.read();
        let mut records: Vec<_> = state
            .records
            .values()
            .filter(|r| location.is_none_or(|l| r.location == *l))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(records)
    }

    async fn find_record(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        Ok(self.read().records.get(&id).cloned())
    }

    async fn create_entry(&self, entry: NewStockEntry) -> Result<InventoryRecord, StoreError> {
        entry.validate()?;
        let now = Utc::now();
        let mut state = self.write();

        let sku = entry.sku.trim();
        let product = match state.products.values().find(|p| p.sku == sku).cloned() {
            Some(product) => product,
            None => {
                let product = Product::create(
                    NewProduct {
                        name: entry.name.clone(),
                        sku: entry.sku.clone(),
                        category: entry.category.clone(),
                        price: entry.price,
                        cost_price: entry.cost_price,
                    },
                    now,
                )?;
                state.products.insert(product.id, product.clone());
                product
            }
        };

        if let Some(existing) = state.record_at(product.id, &entry.location).map(|r| r.id) {
            let record = state.records.get_mut(&existing).unwrap();
            record.quantity += entry.quantity;
            record.last_updated = now;
            return Ok(record.clone());
        }

        let record = InventoryRecord {
            id: RecordId::new(),
            product_id: product.id,
            location: entry.location.clone(),
            quantity: entry.quantity,
            minimum_stock_level: entry.minimum_stock_level,
            unit: entry.unit.trim().to_string(),
            name: product.name.clone(),
            price: product.price,
            cost_price: product.cost_price,
            last_updated: now,
        };
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        id: RecordId,
        changes: RecordChanges,
        product_changes: ProductChanges,
    ) -> Result<InventoryRecord, StoreError> {
        changes.validate()?;
        let now = Utc::now();
        let mut state = self.write();

        let record = state
            .records
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)?;

        if !product_changes.is_empty() {
            let mut product = state
                .products
                .get(&record.product_id)
                .cloned()
                .ok_or_else(StoreError::not_found)?;
            product.apply(product_changes, now)?;
            state.products.insert(product.id, product.clone());
            state.sync_denormalized(&product);
        }

        let record_ref = state.records.get_mut(&id).unwrap();
        if let Some(quantity) = changes.quantity {
            record_ref.quantity = quantity;
        }
        if let Some(minimum) = changes.minimum_stock_level {
            record_ref.minimum_stock_level = minimum;
        }
        record_ref.last_updated = now;
        let snapshot = record_ref.clone();

        // Zero-quantity rows are never persisted.
        if snapshot.quantity == 0 {
            state.records.remove(&id);
            state.remove_product_if_orphaned(snapshot.product_id);
        }

        Ok(snapshot)
    }

    async fn reassign(
        &self,
        id: RecordId,
        destination: Location,
        quantity: i64,
        expected_quantity: Option<i64>,
    ) -> Result<ReassignOutcome, StoreError> {
        let now = Utc::now();
        let mut state = self.write();

        let source = state
            .records
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)?;

        // The client snapshot is only ever *compared* against the fresh
        // state; arithmetic always uses the quantity read under the lock.
        if let Some(expected) = expected_quantity {
            if expected != source.quantity {
                return Err(DomainError::conflict(format!(
                    "record quantity changed (expected {expected}, found {})",
                    source.quantity
                ))
                .into());
            }
        }

        let dest = state.record_at(source.product_id, &destination).cloned();
        let Some(plan) = plan_reassignment(&source, dest.as_ref(), &destination, quantity)?
        else {
            return Ok(ReassignOutcome::Noop { record: source });
        };

        // Source-side write.
        let source_after = match plan.source {
            SourceStep::SetQuantity { id, quantity } => {
                let record = state.records.get_mut(&id).unwrap();
                record.quantity = quantity;
                record.last_updated = now;
                Some(record.clone())
            }
            SourceStep::Remove { id } => {
                state.records.remove(&id);
                None
            }
        };

        // Destination-side write; on simulated failure, roll the source back.
        if self.destination_write_fails() {
            state.records.insert(source.id, source);
            return Err(StoreError::transaction("reassign", "injected write failure"));
        }
        let destination_after = match plan.destination {
            DestinationStep::Increment { id, quantity } => {
                let record = state.records.get_mut(&id).unwrap();
                record.quantity = quantity;
                record.last_updated = now;
                record.clone()
            }
            DestinationStep::Create { template } => {
                let record = InventoryRecord {
                    id: RecordId::new(),
                    product_id: template.product_id,
                    location: template.location,
                    quantity: template.quantity,
                    minimum_stock_level: template.minimum_stock_level,
                    unit: template.unit,
                    name: template.name,
                    price: template.price,
                    cost_price: template.cost_price,
                    last_updated: now,
                };
                state.records.insert(record.id, record.clone());
                record
            }
        };

        Ok(ReassignOutcome::Moved {
            moved: plan.moved,
            source: source_after,
            destination: destination_after,
        })
    }

    async fn delete_record(&self, id: RecordId) -> Result<RecordDeletion, StoreError> {
        let now = Utc::now();
        let mut state = self.write();

        let record = state
            .records
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)?;

        let pool = state.record_at(record.product_id, &Location::Unassigned).cloned();
        let returned_to = match plan_return_to_pool(&record, pool.as_ref())? {
            Some(plan) => match plan.destination {
                DestinationStep::Increment { id, quantity } => {
                    let pool_row = state.records.get_mut(&id).unwrap();
                    pool_row.quantity = quantity;
                    pool_row.last_updated = now;
                    Some(pool_row.clone())
                }
                DestinationStep::Create { template } => {
                    let pool_row = InventoryRecord {
                        id: RecordId::new(),
                        product_id: template.product_id,
                        location: template.location,
                        quantity: template.quantity,
                        minimum_stock_level: template.minimum_stock_level,
                        unit: template.unit,
                        name: template.name,
                        price: template.price,
                        cost_price: template.cost_price,
                        last_updated: now,
                    };
                    state.records.insert(pool_row.id, pool_row.clone());
                    Some(pool_row)
                }
            },
            None => None,
        };

        state.records.remove(&id);
        let product_removed = state.remove_product_if_orphaned(record.product_id);

        Ok(RecordDeletion {
            returned_to,
            product_removed,
        })
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.read();
        let mut products: Vec<_> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read().products.get(&id).cloned())
    }

    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.read().products.values().find(|p| p.sku == sku).cloned())
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut state = self.write();
        let product = Product::create(new, Utc::now())?;
        if state.products.values().any(|p| p.sku == product.sku) {
            return Err(DomainError::conflict(format!(
                "sku '{}' already exists",
                product.sku
            ))
            .into());
        }
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, StoreError> {
        let mut state = self.write();
        let mut product = state
            .products
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)?;
        product.apply(changes, Utc::now())?;
        state.products.insert(product.id, product.clone());
        state.sync_denormalized(&product);
        Ok(product)
    }

    async fn list_godowns(&self) -> Result<Vec<Godown>, StoreError> {
        let mut godowns: Vec<_> = self.read().godowns.values().cloned().collect();
        godowns.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(godowns)
    }

    async fn find_godown(&self, id: GodownId) -> Result<Option<Godown>, StoreError> {
        Ok(self.read().godowns.get(&id).cloned())
    }

    async fn create_godown(&self, new: NewGodown) -> Result<Godown, StoreError> {
        let mut state = self.write();
        let godown = Godown::create(new, Utc::now())?;
        if state.location_name_taken(&godown.name) {
            return Err(DomainError::conflict(format!(
                "location name '{}' already exists",
                godown.name
            ))
            .into());
        }
        state.godowns.insert(godown.id, godown.clone());
        Ok(godown)
    }

    async fn update_godown(
        &self,
        id: GodownId,
        changes: GodownChanges,
    ) -> Result<Godown, StoreError> {
        let mut state = self.write();
        let godown = state
            .godowns
            .get_mut(&id)
            .ok_or_else(StoreError::not_found)?;
        godown.apply(changes, Utc::now());
        Ok(godown.clone())
    }

    async fn delete_godown(&self, id: GodownId) -> Result<(), StoreError> {
        let mut state = self.write();
        let godown = state
            .godowns
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)?;
        let location = Location::Named(godown.name.clone());
        if state.records.values().any(|r| r.location == location) {
            return Err(DomainError::conflict(format!(
                "godown '{}' still holds stock",
                godown.name
            ))
            .into());
        }
        state.godowns.remove(&id);
        Ok(())
    }

    async fn list_shops(&self) -> Result<Vec<Shop>, StoreError> {
        let mut shops: Vec<_> = self.read().shops.values().cloned().collect();
        shops.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(shops)
    }

    async fn find_shop(&self, id: ShopId) -> Result<Option<Shop>, StoreError> {
        Ok(self.read().shops.get(&id).cloned())
    }

    async fn create_shop(&self, new: NewShop) -> Result<Shop, StoreError> {
        let mut state = self.write();
        let shop = Shop::create(new, Utc::now())?;
        if state.location_name_taken(&shop.name) {
            return Err(DomainError::conflict(format!(
                "location name '{}' already exists",
                shop.name
            ))
            .into());
        }
        state.shops.insert(shop.id, shop.clone());
        Ok(shop)
    }

    async fn update_shop(&self, id: ShopId, changes: ShopChanges) -> Result<Shop, StoreError> {
        let mut state = self.write();
        let shop = state.shops.get_mut(&id).ok_or_else(StoreError::not_found)?;
        shop.apply(changes, Utc::now());
        Ok(shop.clone())
    }

    async fn delete_shop(&self, id: ShopId) -> Result<(), StoreError> {
        let mut state = self.write();
        let shop = state
            .shops
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)?;
        let location = Location::Named(shop.name.clone());
        if state.records.values().any(|r| r.location == location) {
            return Err(DomainError::conflict(format!(
                "shop '{}' still holds stock",
                shop.name
            ))
            .into());
        }
        state.shops.remove(&id);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<_> = self.read().users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read().users.get(&id).cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut state = self.write();
        let user = User::create(new, Utc::now())?;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::conflict(format!(
                "email '{}' already exists",
                user.email
            ))
            .into());
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, StoreError> {
        let mut state = self.write();
        let mut user = state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)?;
        user.apply(changes, Utc::now())?;
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(DomainError::conflict(format!(
                "email '{}' already exists",
                user.email
            ))
            .into());
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut state = self.write();
        state
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(StoreError::not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(location: Location, quantity: i64) -> NewStockEntry {
        NewStockEntry {
            name: "Basmati Rice 5kg".to_string(),
            sku: "RICE-5KG".to_string(),
            category: "Grains".to_string(),
            location,
            quantity,
            minimum_stock_level: 10,
            unit: "bags".to_string(),
            price: 1299,
            cost_price: 950,
        }
    }

    fn warehouse_a() -> Location {
        Location::Named("Warehouse A".to_string())
    }

    async fn total_for(store: &MemoryStockStore, product_id: ProductId) -> i64 {
        store
            .list_records(None)
            .await
            .unwrap()
            .iter()
            .filter(|r| r.product_id == product_id)
            .map(|r| r.quantity)
            .sum()
    }

    #[tokio::test]
    async fn reassignment_lifecycle_conserves_quantity() {
        let store = MemoryStockStore::new();
        let source = store.create_entry(entry(Location::Unassigned, 100)).await.unwrap();
        let product_id = source.product_id;

        // Partial move: 100 -> 70 + 30.
        let outcome = store
            .reassign(source.id, warehouse_a(), 30, None)
            .await
            .unwrap();
        let ReassignOutcome::Moved {
            moved,
            source: src_after,
            destination,
        } = outcome
        else {
            panic!("expected a move");
        };
        assert_eq!(moved, 30);
        assert_eq!(src_after.as_ref().unwrap().quantity, 70);
        assert_eq!(destination.quantity, 30);
        assert_eq!(destination.location, warehouse_a());
        assert_eq!(total_for(&store, product_id).await, 100);

        // Over-quantity move is rejected and leaves both rows unchanged.
        let err = store
            .reassign(source.id, warehouse_a(), 80, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::InsufficientQuantity {
                requested: 80,
                available: 70
            })
        ));
        assert_eq!(
            store.find_record(source.id).await.unwrap().unwrap().quantity,
            70
        );
        assert_eq!(total_for(&store, product_id).await, 100);

        // Full move drains and removes the source, merging the destination.
        let outcome = store
            .reassign(source.id, warehouse_a(), 70, None)
            .await
            .unwrap();
        let ReassignOutcome::Moved {
            source: src_after,
            destination,
            ..
        } = outcome
        else {
            panic!("expected a move");
        };
        assert!(src_after.is_none());
        assert_eq!(destination.quantity, 100);
        assert!(store.find_record(source.id).await.unwrap().is_none());
        assert_eq!(total_for(&store, product_id).await, 100);

        // Merge, not duplicate: exactly one row remains for the product.
        let records = store.list_records(None).await.unwrap();
        assert_eq!(
            records
                .iter()
                .filter(|r| r.product_id == product_id)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn same_location_reassign_is_noop_success() {
        let store = MemoryStockStore::new();
        let source = store.create_entry(entry(Location::Unassigned, 50)).await.unwrap();

        let outcome = store
            .reassign(source.id, Location::Unassigned, 10, None)
            .await
            .unwrap();
        assert!(matches!(outcome, ReassignOutcome::Noop { .. }));
        assert_eq!(
            store.find_record(source.id).await.unwrap().unwrap().quantity,
            50
        );
    }

    #[tokio::test]
    async fn stale_snapshot_is_rejected_without_writes() {
        let store = MemoryStockStore::new();
        let source = store.create_entry(entry(Location::Unassigned, 100)).await.unwrap();

        // Client saw 80 units; the row has 100. Arithmetic must not trust
        // the snapshot, so the request fails as a conflict.
        let err = store
            .reassign(source.id, warehouse_a(), 30, Some(80))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::Conflict(_))
        ));
        assert_eq!(
            store.find_record(source.id).await.unwrap().unwrap().quantity,
            100
        );
        assert_eq!(store.list_records(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn destination_write_failure_rolls_back_source() {
        let store = MemoryStockStore::new();
        let source = store.create_entry(entry(Location::Unassigned, 100)).await.unwrap();

        store.fail_next_destination_write();
        let err = store
            .reassign(source.id, warehouse_a(), 30, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transaction { .. }));

        // All-or-nothing: the source still holds its full quantity and no
        // destination row appeared.
        let records = store.list_records(None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, source.id);
        assert_eq!(records[0].quantity, 100);
    }

    #[tokio::test]
    async fn delete_returns_quantity_to_pool() {
        let store = MemoryStockStore::new();
        let pool = store.create_entry(entry(Location::Unassigned, 60)).await.unwrap();
        let assigned = store.create_entry(entry(warehouse_a(), 40)).await.unwrap();
        let product_id = assigned.product_id;

        let deletion = store.delete_record(assigned.id).await.unwrap();
        assert!(!deletion.product_removed);
        let returned = deletion.returned_to.unwrap();
        assert_eq!(returned.id, pool.id);
        assert_eq!(returned.quantity, 100);
        assert_eq!(total_for(&store, product_id).await, 100);
    }

    #[tokio::test]
    async fn deleting_last_record_removes_product() {
        let store = MemoryStockStore::new();
        let record = store.create_entry(entry(Location::Unassigned, 25)).await.unwrap();

        let deletion = store.delete_record(record.id).await.unwrap();
        assert!(deletion.product_removed);
        assert!(deletion.returned_to.is_none());
        assert!(store
            .find_product(record.product_id)
            .await
            .unwrap()
            .is_none());
        assert!(store.list_records(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_entry_merges_existing_row() {
        let store = MemoryStockStore::new();
        let first = store.create_entry(entry(Location::Unassigned, 10)).await.unwrap();
        let second = store.create_entry(entry(Location::Unassigned, 15)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 25);
        assert_eq!(store.list_records(None).await.unwrap().len(), 1);
        assert_eq!(store.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn quantity_correction_to_zero_deletes_row() {
        let store = MemoryStockStore::new();
        let record = store.create_entry(entry(warehouse_a(), 5)).await.unwrap();

        let snapshot = store
            .update_record(
                record.id,
                RecordChanges {
                    quantity: Some(0),
                    ..Default::default()
                },
                ProductChanges::default(),
            )
            .await
            .unwrap();
        assert_eq!(snapshot.quantity, 0);
        assert!(store.find_record(record.id).await.unwrap().is_none());
        // Last row gone => product gone.
        assert!(store
            .find_product(record.product_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn product_edit_syncs_denormalized_copies() {
        let store = MemoryStockStore::new();
        let record = store.create_entry(entry(Location::Unassigned, 10)).await.unwrap();

        store
            .update_product(
                record.product_id,
                ProductChanges {
                    name: Some("Basmati Rice 10kg".to_string()),
                    price: Some(2399),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let record = store.find_record(record.id).await.unwrap().unwrap();
        assert_eq!(record.name, "Basmati Rice 10kg");
        assert_eq!(record.price, 2399);
    }

    #[tokio::test]
    async fn godown_with_stock_cannot_be_deleted() {
        let store = MemoryStockStore::new();
        let godown = store
            .create_godown(NewGodown {
                name: "Warehouse A".to_string(),
                address: String::new(),
                city: String::new(),
            })
            .await
            .unwrap();
        store.create_entry(entry(warehouse_a(), 5)).await.unwrap();

        let err = store.delete_godown(godown.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn location_names_unique_across_godowns_and_shops() {
        let store = MemoryStockStore::new();
        store
            .create_godown(NewGodown {
                name: "Central".to_string(),
                address: String::new(),
                city: String::new(),
            })
            .await
            .unwrap();

        let err = store
            .create_shop(NewShop {
                name: "Central".to_string(),
                address: String::new(),
                city: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }
}
