//! `stockmaster-store` — the record store boundary.
//!
//! Domain crates plan mutations; this crate executes them atomically.
//! Two backends exist:
//! - [`MemoryStockStore`] for tests and dev mode (single state lock);
//! - [`PgStockStore`] for production (sqlx/Postgres, one transaction per
//!   multi-row operation, `SELECT ... FOR UPDATE` on the source row).

pub mod error;
pub mod memory;
pub mod postgres;
pub mod stock_store;

pub use error::StoreError;
pub use memory::MemoryStockStore;
pub use postgres::PgStockStore;
pub use stock_store::{ReassignOutcome, RecordDeletion, StockStore};
