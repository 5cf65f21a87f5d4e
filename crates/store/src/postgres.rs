//! Postgres-backed stock store.
//!
//! Every multi-row operation runs inside a transaction and re-reads the rows
//! it is about to mutate with `SELECT ... FOR UPDATE`, serializing concurrent
//! reassignments of the same record. Failures roll back; readers only ever
//! see committed, conservation-respecting state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use stockmaster_auth::{NewUser, Role, User, UserChanges};
use stockmaster_core::{DomainError, GodownId, ProductId, RecordId, ShopId, UserId};
use stockmaster_inventory::{
    plan_reassignment, plan_return_to_pool, DestinationStep, DestinationTemplate,
    InventoryRecord, Location, NewStockEntry, RecordChanges, SourceStep,
};
use stockmaster_locations::{Godown, GodownChanges, NewGodown, NewShop, Shop, ShopChanges};
use stockmaster_products::{NewProduct, Product, ProductChanges};

use crate::error::StoreError;
use crate::stock_store::{ReassignOutcome, RecordDeletion, StockStore};

/// Postgres [`StockStore`] backend.
pub struct PgStockStore {
    pool: PgPool,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    sku TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL DEFAULT '',
    price BIGINT NOT NULL,
    cost_price BIGINT NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS inventory_records (
    id UUID PRIMARY KEY,
    product_id UUID NOT NULL REFERENCES products(id),
    location TEXT NOT NULL,
    quantity BIGINT NOT NULL CHECK (quantity >= 0),
    minimum_stock_level BIGINT NOT NULL DEFAULT 0,
    unit TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL,
    price BIGINT NOT NULL,
    cost_price BIGINT NOT NULL,
    last_updated TIMESTAMPTZ NOT NULL,
    UNIQUE (product_id, location)
);

CREATE TABLE IF NOT EXISTS godowns (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    address TEXT NOT NULL DEFAULT '',
    city TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS shops (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    address TEXT NOT NULL DEFAULT '',
    city TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    role TEXT NOT NULL,
    location TEXT,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
"#;

impl PgStockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the schema if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    async fn begin(
        &self,
        operation: &'static str,
    ) -> Result<Transaction<'_, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

fn map_sqlx_error(operation: &'static str, e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return DomainError::conflict(format!("unique constraint violated: {db}")).into();
        }
    }
    StoreError::transaction(operation, e.to_string())
}

async fn commit(
    tx: Transaction<'_, Postgres>,
    operation: &'static str,
) -> Result<(), StoreError> {
    tx.commit().await.map_err(|e| map_sqlx_error(operation, e))
}

// ── row mapping ──────────────────────────────────────────────────────────

fn record_from_row(row: &PgRow) -> Result<InventoryRecord, StoreError> {
    let location: String = get(row, "location")?;
    Ok(InventoryRecord {
        id: RecordId::from_uuid(get::<Uuid>(row, "id")?),
        product_id: ProductId::from_uuid(get::<Uuid>(row, "product_id")?),
        location: Location::parse(&location)?,
        quantity: get(row, "quantity")?,
        minimum_stock_level: get(row, "minimum_stock_level")?,
        unit: get(row, "unit")?,
        name: get(row, "name")?,
        price: get(row, "price")?,
        cost_price: get(row, "cost_price")?,
        last_updated: get(row, "last_updated")?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId::from_uuid(get::<Uuid>(row, "id")?),
        name: get(row, "name")?,
        sku: get(row, "sku")?,
        category: get(row, "category")?,
        price: get(row, "price")?,
        cost_price: get(row, "cost_price")?,
        active: get(row, "active")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn godown_from_row(row: &PgRow) -> Result<Godown, StoreError> {
    Ok(Godown {
        id: GodownId::from_uuid(get::<Uuid>(row, "id")?),
        name: get(row, "name")?,
        address: get(row, "address")?,
        city: get(row, "city")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn shop_from_row(row: &PgRow) -> Result<Shop, StoreError> {
    Ok(Shop {
        id: ShopId::from_uuid(get::<Uuid>(row, "id")?),
        name: get(row, "name")?,
        address: get(row, "address")?,
        city: get(row, "city")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = get(row, "role")?;
    Ok(User {
        id: UserId::from_uuid(get::<Uuid>(row, "id")?),
        email: get(row, "email")?,
        display_name: get(row, "display_name")?,
        role: role.parse::<Role>()?,
        location: get(row, "location")?,
        active: get(row, "active")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn get<'r, T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>>(
    row: &'r PgRow,
    column: &str,
) -> Result<T, StoreError> {
    row.try_get(column)
        .map_err(|e| StoreError::transaction("decode_row", e.to_string()))
}

const RECORD_COLUMNS: &str = "id, product_id, location, quantity, minimum_stock_level, unit, \
                              name, price, cost_price, last_updated";

// ── locked reads inside transactions ─────────────────────────────────────

async fn fetch_record_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: RecordId,
) -> Result<Option<InventoryRecord>, StoreError> {
    let row = sqlx::query(&format!(
        "SELECT {RECORD_COLUMNS} FROM inventory_records WHERE id = $1 FOR UPDATE"
    ))
    .bind(id.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_record", e))?;
    row.as_ref().map(record_from_row).transpose()
}

async fn fetch_record_at_for_update(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    location: &Location,
) -> Result<Option<InventoryRecord>, StoreError> {
    let row = sqlx::query(&format!(
        "SELECT {RECORD_COLUMNS} FROM inventory_records \
         WHERE product_id = $1 AND location = $2 FOR UPDATE"
    ))
    .bind(product_id.as_uuid())
    .bind(location.as_str())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_record", e))?;
    row.as_ref().map(record_from_row).transpose()
}

async fn insert_record_from_template(
    tx: &mut Transaction<'_, Postgres>,
    template: &DestinationTemplate,
    now: DateTime<Utc>,
) -> Result<InventoryRecord, StoreError> {
    let record = InventoryRecord {
        id: RecordId::new(),
        product_id: template.product_id,
        location: template.location.clone(),
        quantity: template.quantity,
        minimum_stock_level: template.minimum_stock_level,
        unit: template.unit.clone(),
        name: template.name.clone(),
        price: template.price,
        cost_price: template.cost_price,
        last_updated: now,
    };
    insert_record(tx, &record).await?;
    Ok(record)
}

async fn insert_record(
    tx: &mut Transaction<'_, Postgres>,
    record: &InventoryRecord,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO inventory_records \
         (id, product_id, location, quantity, minimum_stock_level, unit, name, price, cost_price, last_updated) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(record.id.as_uuid())
    .bind(record.product_id.as_uuid())
    .bind(record.location.as_str())
    .bind(record.quantity)
    .bind(record.minimum_stock_level)
    .bind(&record.unit)
    .bind(&record.name)
    .bind(record.price)
    .bind(record.cost_price)
    .bind(record.last_updated)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_record", e))?;
    Ok(())
}

async fn set_record_quantity(
    tx: &mut Transaction<'_, Postgres>,
    id: RecordId,
    quantity: i64,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query("UPDATE inventory_records SET quantity = $2, last_updated = $3 WHERE id = $1")
        .bind(id.as_uuid())
        .bind(quantity)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update_record", e))?;
    Ok(())
}

async fn delete_record_row(
    tx: &mut Transaction<'_, Postgres>,
    id: RecordId,
) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM inventory_records WHERE id = $1")
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("delete_record", e))?;
    Ok(())
}

/// Remove the product row once no records reference it. Returns true when
/// the product was removed.
async fn remove_product_if_orphaned(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<bool, StoreError> {
    let remaining: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM inventory_records WHERE product_id = $1",
    )
    .bind(product_id.as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("count_records", e))?;

    if remaining == 0 {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id.as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        return Ok(true);
    }
    Ok(false)
}

async fn update_product_row(
    tx: &mut Transaction<'_, Postgres>,
    product: &Product,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE products SET name = $2, category = $3, price = $4, cost_price = $5, \
         active = $6, updated_at = $7 WHERE id = $1",
    )
    .bind(product.id.as_uuid())
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.price)
    .bind(product.cost_price)
    .bind(product.active)
    .bind(product.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("update_product", e))?;

    // Keep denormalized display copies in sync.
    sqlx::query(
        "UPDATE inventory_records SET name = $2, price = $3, cost_price = $4 \
         WHERE product_id = $1",
    )
    .bind(product.id.as_uuid())
    .bind(&product.name)
    .bind(product.price)
    .bind(product.cost_price)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("sync_denormalized", e))?;
    Ok(())
}

async fn insert_product(
    tx: &mut Transaction<'_, Postgres>,
    product: &Product,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO products (id, name, sku, category, price, cost_price, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(product.id.as_uuid())
    .bind(&product.name)
    .bind(&product.sku)
    .bind(&product.category)
    .bind(product.price)
    .bind(product.cost_price)
    .bind(product.active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_product", e))?;
    Ok(())
}

async fn location_name_taken(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<bool, StoreError> {
    let taken: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM godowns WHERE name = $1 UNION SELECT 1 FROM shops WHERE name = $1 LIMIT 1",
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("check_location_name", e))?;
    Ok(taken.is_some())
}

async fn location_holds_stock(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<bool, StoreError> {
    let held: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM inventory_records WHERE location = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("check_location_stock", e))?;
    Ok(held.is_some())
}

#[async_trait]
impl StockStore for PgStockStore {
    async fn list_records(
        &self,
        location: Option<&Location>,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        let rows = match location {
            Some(location) => {
                sqlx::query(&format!(
                    "SELECT {RECORD_COLUMNS} FROM inventory_records \
                     WHERE location = $1 ORDER BY last_updated DESC"
                ))
                .bind(location.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {RECORD_COLUMNS} FROM inventory_records ORDER BY last_updated DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| map_sqlx_error("list_records", e))?;
        rows.iter().map(record_from_row).collect()
    }

    async fn find_record(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM inventory_records WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_record", e))?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn create_entry(&self, entry: NewStockEntry) -> Result<InventoryRecord, StoreError> {
        entry.validate()?;
        let now = Utc::now();
        let mut tx = self.begin("create_entry").await?;

        let row = sqlx::query("SELECT * FROM products WHERE sku = $1 FOR UPDATE")
            .bind(entry.sku.trim())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_product_by_sku", e))?;
        let product = match row.as_ref().map(product_from_row).transpose()? {
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
                insert_product(&mut tx, &product).await?;
                product
            }
        };

        let record = match fetch_record_at_for_update(&mut tx, product.id, &entry.location).await? {
            Some(existing) => {
                let merged = existing.quantity + entry.quantity;
                set_record_quantity(&mut tx, existing.id, merged, now).await?;
                InventoryRecord {
                    quantity: merged,
                    last_updated: now,
                    ..existing
                }
            }
            None => {
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
                insert_record(&mut tx, &record).await?;
                record
            }
        };

        commit(tx, "create_entry").await?;
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
        let mut tx = self.begin("update_record").await?;

        let mut record = fetch_record_for_update(&mut tx, id)
            .await?
            .ok_or_else(StoreError::not_found)?;

        if !product_changes.is_empty() {
            let row = sqlx::query("SELECT * FROM products WHERE id = $1 FOR UPDATE")
                .bind(record.product_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("find_product", e))?;
            let mut product = row
                .as_ref()
                .map(product_from_row)
                .transpose()?
                .ok_or_else(StoreError::not_found)?;
            product.apply(product_changes, now)?;
            update_product_row(&mut tx, &product).await?;
            record.name = product.name;
            record.price = product.price;
            record.cost_price = product.cost_price;
        }

        if let Some(quantity) = changes.quantity {
            record.quantity = quantity;
        }
        if let Some(minimum) = changes.minimum_stock_level {
            record.minimum_stock_level = minimum;
        }
        record.last_updated = now;

        if record.quantity == 0 {
            // Zero-quantity rows are never persisted.
            delete_record_row(&mut tx, id).await?;
            remove_product_if_orphaned(&mut tx, record.product_id).await?;
        } else {
            sqlx::query(
                "UPDATE inventory_records SET quantity = $2, minimum_stock_level = $3, \
                 last_updated = $4 WHERE id = $1",
            )
            .bind(id.as_uuid())
            .bind(record.quantity)
            .bind(record.minimum_stock_level)
            .bind(record.last_updated)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_record", e))?;
        }

        commit(tx, "update_record").await?;
        Ok(record)
    }

    async fn reassign(
        &self,
        id: RecordId,
        destination: Location,
        quantity: i64,
        expected_quantity: Option<i64>,
    ) -> Result<ReassignOutcome, StoreError> {
        let now = Utc::now();
        let mut tx = self.begin("reassign").await?;

        // Row lock: concurrent reassignments of the same source serialize
        // here, so the arithmetic below always sees committed state.
        let source = fetch_record_for_update(&mut tx, id)
            .await?
            .ok_or_else(StoreError::not_found)?;

        // The client snapshot is only ever *compared* against the locked
        // row; arithmetic always uses the fresh quantity.
        if let Some(expected) = expected_quantity {
            if expected != source.quantity {
                return Err(DomainError::conflict(format!(
                    "record quantity changed (expected {expected}, found {})",
                    source.quantity
                ))
                .into());
            }
        }

        let dest = fetch_record_at_for_update(&mut tx, source.product_id, &destination).await?;
        let Some(plan) = plan_reassignment(&source, dest.as_ref(), &destination, quantity)?
        else {
            return Ok(ReassignOutcome::Noop { record: source });
        };

        let source_after = match plan.source {
            SourceStep::SetQuantity { id, quantity } => {
                set_record_quantity(&mut tx, id, quantity, now).await?;
                Some(InventoryRecord {
                    quantity,
                    last_updated: now,
                    ..source.clone()
                })
            }
            SourceStep::Remove { id } => {
                delete_record_row(&mut tx, id).await?;
                None
            }
        };

        let destination_after = match (plan.destination, dest) {
            (DestinationStep::Increment { id, quantity }, Some(dest_row)) => {
                set_record_quantity(&mut tx, id, quantity, now).await?;
                InventoryRecord {
                    quantity,
                    last_updated: now,
                    ..dest_row
                }
            }
            (DestinationStep::Create { template }, _) => {
                insert_record_from_template(&mut tx, &template, now).await?
            }
            (DestinationStep::Increment { .. }, None) => {
                return Err(DomainError::invariant(
                    "destination row disappeared inside the transaction",
                )
                .into())
            }
        };

        commit(tx, "reassign").await?;
        tracing::debug!(
            record = %id,
            destination = %destination_after.location,
            moved = plan.moved,
            "stock reassigned"
        );

        Ok(ReassignOutcome::Moved {
            moved: plan.moved,
            source: source_after,
            destination: destination_after,
        })
    }

    async fn delete_record(&self, id: RecordId) -> Result<RecordDeletion, StoreError> {
        let now = Utc::now();
        let mut tx = self.begin("delete_record").await?;

        let record = fetch_record_for_update(&mut tx, id)
            .await?
            .ok_or_else(StoreError::not_found)?;

        let pool =
            fetch_record_at_for_update(&mut tx, record.product_id, &Location::Unassigned).await?;
        let returned_to = match plan_return_to_pool(&record, pool.as_ref())? {
            Some(plan) => match (plan.destination, pool) {
                (DestinationStep::Increment { id, quantity }, Some(pool_row)) => {
                    set_record_quantity(&mut tx, id, quantity, now).await?;
                    Some(InventoryRecord {
                        quantity,
                        last_updated: now,
                        ..pool_row
                    })
                }
                (DestinationStep::Create { template }, _) => {
                    Some(insert_record_from_template(&mut tx, &template, now).await?)
                }
                (DestinationStep::Increment { .. }, None) => {
                    return Err(DomainError::invariant(
                        "pool row disappeared inside the transaction",
                    )
                    .into())
                }
            },
            None => None,
        };

        delete_record_row(&mut tx, id).await?;
        let product_removed = remove_product_if_orphaned(&mut tx, record.product_id).await?;

        commit(tx, "delete_record").await?;
        tracing::debug!(record = %id, product_removed, "stock record deleted");

        Ok(RecordDeletion {
            returned_to,
            product_removed,
        })
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT * FROM products WHERE sku = $1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product_by_sku", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let product = Product::create(new, Utc::now())?;
        let mut tx = self.begin("create_product").await?;
        insert_product(&mut tx, &product).await?;
        commit(tx, "create_product").await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, StoreError> {
        let mut tx = self.begin("update_product").await?;
        let row = sqlx::query("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;
        let mut product = row
            .as_ref()
            .map(product_from_row)
            .transpose()?
            .ok_or_else(StoreError::not_found)?;
        product.apply(changes, Utc::now())?;
        update_product_row(&mut tx, &product).await?;
        commit(tx, "update_product").await?;
        Ok(product)
    }

    async fn list_godowns(&self) -> Result<Vec<Godown>, StoreError> {
        let rows = sqlx::query("SELECT * FROM godowns ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_godowns", e))?;
        rows.iter().map(godown_from_row).collect()
    }

    async fn find_godown(&self, id: GodownId) -> Result<Option<Godown>, StoreError> {
        let row = sqlx::query("SELECT * FROM godowns WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_godown", e))?;
        row.as_ref().map(godown_from_row).transpose()
    }

    async fn create_godown(&self, new: NewGodown) -> Result<Godown, StoreError> {
        let godown = Godown::create(new, Utc::now())?;
        let mut tx = self.begin("create_godown").await?;
        if location_name_taken(&mut tx, &godown.name).await? {
            return Err(DomainError::conflict(format!(
                "location name '{}' already exists",
                godown.name
            ))
            .into());
        }
        sqlx::query(
            "INSERT INTO godowns (id, name, address, city, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(godown.id.as_uuid())
        .bind(&godown.name)
        .bind(&godown.address)
        .bind(&godown.city)
        .bind(godown.created_at)
        .bind(godown.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_godown", e))?;
        commit(tx, "create_godown").await?;
        Ok(godown)
    }

    async fn update_godown(
        &self,
        id: GodownId,
        changes: GodownChanges,
    ) -> Result<Godown, StoreError> {
        let mut tx = self.begin("update_godown").await?;
        let row = sqlx::query("SELECT * FROM godowns WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_godown", e))?;
        let mut godown = row
            .as_ref()
            .map(godown_from_row)
            .transpose()?
            .ok_or_else(StoreError::not_found)?;
        godown.apply(changes, Utc::now());
        sqlx::query("UPDATE godowns SET address = $2, city = $3, updated_at = $4 WHERE id = $1")
            .bind(godown.id.as_uuid())
            .bind(&godown.address)
            .bind(&godown.city)
            .bind(godown.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_godown", e))?;
        commit(tx, "update_godown").await?;
        Ok(godown)
    }

    async fn delete_godown(&self, id: GodownId) -> Result<(), StoreError> {
        let mut tx = self.begin("delete_godown").await?;
        let row = sqlx::query("SELECT * FROM godowns WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_godown", e))?;
        let godown = row
            .as_ref()
            .map(godown_from_row)
            .transpose()?
            .ok_or_else(StoreError::not_found)?;
        if location_holds_stock(&mut tx, &godown.name).await? {
            return Err(DomainError::conflict(format!(
                "godown '{}' still holds stock",
                godown.name
            ))
            .into());
        }
        sqlx::query("DELETE FROM godowns WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_godown", e))?;
        commit(tx, "delete_godown").await
    }

    async fn list_shops(&self) -> Result<Vec<Shop>, StoreError> {
        let rows = sqlx::query("SELECT * FROM shops ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_shops", e))?;
        rows.iter().map(shop_from_row).collect()
    }

    async fn find_shop(&self, id: ShopId) -> Result<Option<Shop>, StoreError> {
        let row = sqlx::query("SELECT * FROM shops WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_shop", e))?;
        row.as_ref().map(shop_from_row).transpose()
    }

    async fn create_shop(&self, new: NewShop) -> Result<Shop, StoreError> {
        let shop = Shop::create(new, Utc::now())?;
        let mut tx = self.begin("create_shop").await?;
        if location_name_taken(&mut tx, &shop.name).await? {
            return Err(DomainError::conflict(format!(
                "location name '{}' already exists",
                shop.name
            ))
            .into());
        }
        sqlx::query(
            "INSERT INTO shops (id, name, address, city, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(shop.id.as_uuid())
        .bind(&shop.name)
        .bind(&shop.address)
        .bind(&shop.city)
        .bind(shop.created_at)
        .bind(shop.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_shop", e))?;
        commit(tx, "create_shop").await?;
        Ok(shop)
    }

    async fn update_shop(&self, id: ShopId, changes: ShopChanges) -> Result<Shop, StoreError> {
        let mut tx = self.begin("update_shop").await?;
        let row = sqlx::query("SELECT * FROM shops WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_shop", e))?;
        let mut shop = row
            .as_ref()
            .map(shop_from_row)
            .transpose()?
            .ok_or_else(StoreError::not_found)?;
        shop.apply(changes, Utc::now());
        sqlx::query("UPDATE shops SET address = $2, city = $3, updated_at = $4 WHERE id = $1")
            .bind(shop.id.as_uuid())
            .bind(&shop.address)
            .bind(&shop.city)
            .bind(shop.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_shop", e))?;
        commit(tx, "update_shop").await?;
        Ok(shop)
    }

    async fn delete_shop(&self, id: ShopId) -> Result<(), StoreError> {
        let mut tx = self.begin("delete_shop").await?;
        let row = sqlx::query("SELECT * FROM shops WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_shop", e))?;
        let shop = row
            .as_ref()
            .map(shop_from_row)
            .transpose()?
            .ok_or_else(StoreError::not_found)?;
        if location_holds_stock(&mut tx, &shop.name).await? {
            return Err(DomainError::conflict(format!(
                "shop '{}' still holds stock",
                shop.name
            ))
            .into());
        }
        sqlx::query("DELETE FROM shops WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_shop", e))?;
        commit(tx, "delete_shop").await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY email")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(user_from_row).collect()
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let user = User::create(new, Utc::now())?;
        sqlx::query(
            "INSERT INTO users (id, email, display_name, role, location, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(&user.location)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(user)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, StoreError> {
        let mut tx = self.begin("update_user").await?;
        let row = sqlx::query("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;
        let mut user = row
            .as_ref()
            .map(user_from_row)
            .transpose()?
            .ok_or_else(StoreError::not_found)?;
        user.apply(changes, Utc::now())?;
        sqlx::query(
            "UPDATE users SET email = $2, display_name = $3, role = $4, location = $5, \
             active = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(&user.location)
        .bind(user.active)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;
        commit(tx, "update_user").await?;
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }
}
