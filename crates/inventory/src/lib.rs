//! Inventory domain module.
//!
//! This crate contains business rules for stock records, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage). The
//! reassignment planner produces all-or-nothing mutation plans; executing a
//! plan atomically is the store's job.

pub mod reassign;
pub mod record;

pub use reassign::{
    plan_reassignment, plan_return_to_pool, DestinationStep, DestinationTemplate,
    ReassignmentPlan, SourceStep,
};
pub use record::{InventoryRecord, Location, NewStockEntry, RecordChanges, StockStatus};
