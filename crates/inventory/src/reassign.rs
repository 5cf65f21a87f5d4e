//! Reassignment planning.
//!
//! Moving `N` units of a product between locations touches up to two rows:
//! the source (decrement or delete) and the destination (merge-increment or
//! create). `plan_reassignment` validates a requested move against fresh
//! source/destination state and returns the row mutations as data; the store
//! executes a plan inside one transaction so readers never observe a partial
//! move. Total quantity per product is conserved by construction: the amount
//! removed from the source equals the amount added to the destination.

use stockmaster_core::{DomainError, ProductId, RecordId};

use crate::record::{InventoryRecord, Location};

/// Mutation of the source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStep {
    /// Set the source quantity to the remainder.
    SetQuantity { id: RecordId, quantity: i64 },
    /// The move drained the source; delete the row instead of keeping a
    /// zero-quantity record.
    Remove { id: RecordId },
}

/// Mutation of the destination row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationStep {
    /// Merge into the existing `(product, location)` row; `quantity` is the
    /// new total.
    Increment { id: RecordId, quantity: i64 },
    /// No row exists at the destination yet; create one.
    Create { template: DestinationTemplate },
}

/// Field template for a destination row created by a move. Display fields are
/// copied from the source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTemplate {
    pub product_id: ProductId,
    pub location: Location,
    pub quantity: i64,
    pub minimum_stock_level: i64,
    pub unit: String,
    pub name: String,
    pub price: i64,
    pub cost_price: i64,
}

/// All-or-nothing plan for one reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentPlan {
    /// Units moved from source to destination.
    pub moved: i64,
    pub source: SourceStep,
    pub destination: DestinationStep,
}

/// Plan moving `quantity` units of the source record to
/// `destination_location`.
///
/// `destination` must be the current `(product, destination_location)` row if
/// one exists, freshly read under the same lock/transaction as `source`.
///
/// Returns `Ok(None)` when the destination equals the source location: no
/// quantity changes hands, so the request is a no-op success rather than an
/// error.
pub fn plan_reassignment(
    source: &InventoryRecord,
    destination: Option<&InventoryRecord>,
    destination_location: &Location,
    quantity: i64,
) -> Result<Option<ReassignmentPlan>, DomainError> {
    if *destination_location == source.location {
        return Ok(None);
    }

    if quantity <= 0 {
        return Err(DomainError::validation(
            "quantity to move must be positive",
        ));
    }
    if quantity > source.quantity {
        return Err(DomainError::insufficient_quantity(
            quantity,
            source.quantity,
        ));
    }

    if let Some(dest) = destination {
        if dest.product_id != source.product_id {
            return Err(DomainError::invariant(
                "destination record belongs to a different product",
            ));
        }
        if dest.location != *destination_location {
            return Err(DomainError::invariant(
                "destination record is not at the destination location",
            ));
        }
        if dest.id == source.id {
            return Err(DomainError::invariant(
                "source and destination are the same record",
            ));
        }
    }

    let remaining = source.quantity - quantity;
    let source_step = if remaining == 0 {
        SourceStep::Remove { id: source.id }
    } else {
        SourceStep::SetQuantity {
            id: source.id,
            quantity: remaining,
        }
    };

    let destination_step = match destination {
        Some(dest) => DestinationStep::Increment {
            id: dest.id,
            quantity: dest.quantity + quantity,
        },
        None => DestinationStep::Create {
            template: DestinationTemplate {
                product_id: source.product_id,
                location: destination_location.clone(),
                quantity,
                minimum_stock_level: source.minimum_stock_level,
                unit: source.unit.clone(),
                name: source.name.clone(),
                price: source.price,
                cost_price: source.cost_price,
            },
        },
    };

    Ok(Some(ReassignmentPlan {
        moved: quantity,
        source: source_step,
        destination: destination_step,
    }))
}

/// Plan returning a record's full quantity to the product's Unassigned pool,
/// as done by record deletion.
///
/// Returns `Ok(None)` when there is nothing to move: the record already sits
/// in the pool (delete it outright) or holds no quantity.
pub fn plan_return_to_pool(
    record: &InventoryRecord,
    pool: Option<&InventoryRecord>,
) -> Result<Option<ReassignmentPlan>, DomainError> {
    if record.location.is_unassigned() || record.quantity == 0 {
        return Ok(None);
    }
    plan_reassignment(record, pool, &Location::Unassigned, record.quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(location: Location, quantity: i64, product_id: ProductId) -> InventoryRecord {
        InventoryRecord {
            id: RecordId::new(),
            product_id,
            location,
            quantity,
            minimum_stock_level: 10,
            unit: "pcs".to_string(),
            name: "Widget".to_string(),
            price: 500,
            cost_price: 300,
            last_updated: Utc::now(),
        }
    }

    fn named(name: &str) -> Location {
        Location::Named(name.to_string())
    }

    #[test]
    fn partial_move_splits_source_and_creates_destination() {
        let product = ProductId::new();
        let source = record(Location::Unassigned, 100, product);

        let plan = plan_reassignment(&source, None, &named("Warehouse A"), 30)
            .unwrap()
            .unwrap();

        assert_eq!(plan.moved, 30);
        assert_eq!(
            plan.source,
            SourceStep::SetQuantity {
                id: source.id,
                quantity: 70
            }
        );
        match plan.destination {
            DestinationStep::Create { template } => {
                assert_eq!(template.product_id, product);
                assert_eq!(template.location, named("Warehouse A"));
                assert_eq!(template.quantity, 30);
                assert_eq!(template.name, "Widget");
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn over_quantity_move_is_insufficient_quantity() {
        let source = record(Location::Unassigned, 70, ProductId::new());
        let err = plan_reassignment(&source, None, &named("Warehouse A"), 80).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientQuantity {
                requested: 80,
                available: 70
            }
        );
    }

    #[test]
    fn full_move_removes_source_and_merges_destination() {
        let product = ProductId::new();
        let source = record(Location::Unassigned, 70, product);
        let dest = record(named("Warehouse A"), 30, product);

        let plan = plan_reassignment(&source, Some(&dest), &named("Warehouse A"), 70)
            .unwrap()
            .unwrap();

        assert_eq!(plan.source, SourceStep::Remove { id: source.id });
        assert_eq!(
            plan.destination,
            DestinationStep::Increment {
                id: dest.id,
                quantity: 100
            }
        );
    }

    #[test]
    fn same_location_is_a_noop() {
        let source = record(named("Warehouse A"), 50, ProductId::new());
        let plan = plan_reassignment(&source, None, &named("Warehouse A"), 10).unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn zero_and_negative_quantities_rejected() {
        let source = record(Location::Unassigned, 50, ProductId::new());
        for quantity in [0, -5] {
            let err =
                plan_reassignment(&source, None, &named("Warehouse A"), quantity).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn cross_product_destination_rejected() {
        let source = record(Location::Unassigned, 50, ProductId::new());
        let dest = record(named("Warehouse A"), 5, ProductId::new());
        let err =
            plan_reassignment(&source, Some(&dest), &named("Warehouse A"), 10).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn return_to_pool_merges_into_existing_pool_row() {
        let product = ProductId::new();
        let assigned = record(named("North Shop"), 40, product);
        let pool = record(Location::Unassigned, 60, product);

        let plan = plan_return_to_pool(&assigned, Some(&pool)).unwrap().unwrap();
        assert_eq!(plan.moved, 40);
        assert_eq!(plan.source, SourceStep::Remove { id: assigned.id });
        assert_eq!(
            plan.destination,
            DestinationStep::Increment {
                id: pool.id,
                quantity: 100
            }
        );
    }

    #[test]
    fn return_to_pool_is_noop_for_pool_rows() {
        let pool = record(Location::Unassigned, 60, ProductId::new());
        assert!(plan_return_to_pool(&pool, None).unwrap().is_none());
    }

    mod conservation {
        use super::*;
        use proptest::prelude::*;

        /// Apply a plan to a two-slot model of (source, destination) rows and
        /// return the resulting quantities, `None` for deleted rows.
        fn apply(
            plan: &ReassignmentPlan,
            source: &InventoryRecord,
            dest: Option<&InventoryRecord>,
        ) -> (Option<i64>, i64) {
            let source_after = match plan.source {
                SourceStep::SetQuantity { id, quantity } => {
                    assert_eq!(id, source.id);
                    assert!(quantity > 0);
                    Some(quantity)
                }
                SourceStep::Remove { id } => {
                    assert_eq!(id, source.id);
                    None
                }
            };
            let dest_after = match &plan.destination {
                DestinationStep::Increment { id, quantity } => {
                    assert_eq!(Some(*id), dest.map(|d| d.id));
                    *quantity
                }
                DestinationStep::Create { template } => {
                    assert!(dest.is_none());
                    template.quantity
                }
            };
            (source_after, dest_after)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: a planned move conserves total quantity and never
            /// leaves a non-positive row behind.
            #[test]
            fn planned_moves_conserve_quantity(
                source_qty in 1i64..10_000,
                dest_qty in proptest::option::of(0i64..10_000),
                move_qty in 1i64..10_000,
            ) {
                let product = ProductId::new();
                let source = record(Location::Unassigned, source_qty, product);
                let dest = dest_qty.map(|q| record(named("Warehouse A"), q, product));

                let total_before = source_qty + dest_qty.unwrap_or(0);
                match plan_reassignment(&source, dest.as_ref(), &named("Warehouse A"), move_qty) {
                    Ok(Some(plan)) => {
                        prop_assert_eq!(plan.moved, move_qty);
                        let (source_after, dest_after) = apply(&plan, &source, dest.as_ref());
                        prop_assert_eq!(
                            source_after.unwrap_or(0) + dest_after,
                            total_before
                        );
                        prop_assert!(dest_after > 0);
                    }
                    Ok(None) => prop_assert!(false, "unexpected no-op"),
                    Err(DomainError::InsufficientQuantity { requested, available }) => {
                        prop_assert_eq!(requested, move_qty);
                        prop_assert_eq!(available, source_qty);
                        prop_assert!(move_qty > source_qty);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {e}"),
                }
            }

            /// Property: chaining moves through several locations conserves
            /// the per-product total.
            #[test]
            fn chained_moves_conserve_total(
                initial in 1i64..1_000,
                moves in proptest::collection::vec((0usize..3, 1i64..1_000), 1..8),
            ) {
                let product = ProductId::new();
                let locations = [
                    Location::Unassigned,
                    named("Warehouse A"),
                    named("North Shop"),
                ];
                // One slot per location; start with everything in the pool.
                let mut rows: Vec<Option<InventoryRecord>> = vec![
                    Some(record(Location::Unassigned, initial, product)),
                    None,
                    None,
                ];

                for (dest_idx, qty) in moves {
                    // Move from the fullest row to keep requests mostly valid.
                    let src_idx = (0..3)
                        .filter(|i| rows[*i].is_some())
                        .max_by_key(|i| rows[*i].as_ref().unwrap().quantity)
                        .unwrap();
                    let source = rows[src_idx].clone().unwrap();
                    let dest = rows[dest_idx].clone();

                    match plan_reassignment(&source, dest.as_ref(), &locations[dest_idx], qty) {
                        Ok(Some(plan)) => {
                            match plan.source {
                                SourceStep::SetQuantity { quantity, .. } => {
                                    rows[src_idx].as_mut().unwrap().quantity = quantity;
                                }
                                SourceStep::Remove { .. } => rows[src_idx] = None,
                            }
                            match plan.destination {
                                DestinationStep::Increment { quantity, .. } => {
                                    rows[dest_idx].as_mut().unwrap().quantity = quantity;
                                }
                                DestinationStep::Create { template } => {
                                    let mut created =
                                        record(template.location.clone(), template.quantity, product);
                                    created.minimum_stock_level = template.minimum_stock_level;
                                    rows[dest_idx] = Some(created);
                                }
                            }
                        }
                        Ok(None) | Err(_) => {}
                    }

                    let total: i64 = rows
                        .iter()
                        .filter_map(|r| r.as_ref().map(|r| r.quantity))
                        .sum();
                    prop_assert_eq!(total, initial);
                    prop_assert!(rows.iter().flatten().all(|r| r.quantity > 0));
                }
            }
        }
    }
}
