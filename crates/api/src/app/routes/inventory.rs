use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockmaster_auth::permissions;
use stockmaster_core::{ProductId, RecordId};
use stockmaster_inventory::{Location, NewStockEntry, RecordChanges};
use stockmaster_products::{Product, ProductChanges};
use stockmaster_store::ReassignOutcome;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_records).post(create_entry))
        .route("/low-stock", get(low_stock))
        .route(
            "/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
}

/// Load the product rows referenced by `records`, keyed by id, for the flat
/// wire shape (`sku`/`category` live on the product).
async fn products_for(
    services: &AppServices,
    records: &[stockmaster_inventory::InventoryRecord],
) -> Result<HashMap<ProductId, Product>, axum::response::Response> {
    let mut products = HashMap::new();
    for record in records {
        if products.contains_key(&record.product_id) {
            continue;
        }
        match services.store().find_product(record.product_id).await {
            Ok(Some(product)) => {
                products.insert(record.product_id, product);
            }
            Ok(None) => {}
            Err(e) => return Err(errors::store_error_to_response(e)),
        }
    }
    Ok(products)
}

pub async fn list_records(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::INVENTORY_READ) {
        return errors::authz_error_to_response(e);
    }

    let records = match services.store().list_records(None).await {
        Ok(records) => records,
        Err(e) => return errors::store_error_to_response(e),
    };
    let visible: Vec<_> = records
        .into_iter()
        .filter(|r| authz::can_view_location(&principal, &r.location))
        .collect();

    let products = match products_for(&services, &visible).await {
        Ok(products) => products,
        Err(resp) => return resp,
    };

    let body: Vec<_> = visible
        .iter()
        .map(|r| dto::record_to_json(r, products.get(&r.product_id)))
        .collect();
    (StatusCode::OK, Json(serde_json::json!(body))).into_response()
}

pub async fn low_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::INVENTORY_READ) {
        return errors::authz_error_to_response(e);
    }

    let records = match services.store().list_records(None).await {
        Ok(records) => records,
        Err(e) => return errors::store_error_to_response(e),
    };
    let low: Vec<_> = records
        .into_iter()
        .filter(|r| {
            authz::can_view_location(&principal, &r.location)
                && r.quantity <= r.minimum_stock_level
        })
        .collect();

    let products = match products_for(&services, &low).await {
        Ok(products) => products,
        Err(resp) => return resp,
    };

    let body: Vec<_> = low
        .iter()
        .map(|r| dto::record_to_json(r, products.get(&r.product_id)))
        .collect();
    (StatusCode::OK, Json(serde_json::json!(body))).into_response()
}

pub async fn create_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateEntryRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::INVENTORY_WRITE) {
        return errors::authz_error_to_response(e);
    }

    let location = match body.location.as_deref() {
        Some(raw) => match Location::parse(raw) {
            Ok(location) => location,
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => Location::Unassigned,
    };
    if let Err(e) = authz::require_location(&principal, &location) {
        return errors::authz_error_to_response(e);
    }

    let entry = NewStockEntry {
        name: body.name,
        sku: body.sku,
        category: body.category.unwrap_or_default(),
        location: location.clone(),
        quantity: body.quantity,
        minimum_stock_level: body.minimum_stock_level.unwrap_or(0),
        unit: body.unit.unwrap_or_default(),
        price: body.price.unwrap_or(0),
        cost_price: body.cost_price.unwrap_or(0),
    };

    let record = match services.store().create_entry(entry).await {
        Ok(record) => record,
        Err(e) => return errors::store_error_to_response(e),
    };
    let product = match services.store().find_product(record.product_id).await {
        Ok(product) => product,
        Err(e) => return errors::store_error_to_response(e),
    };

    services.publish(
        "inventory.updated",
        &record.location,
        serde_json::json!({
            "kind": "entry_created",
            "recordId": record.id.to_string(),
            "location": record.location.as_str(),
            "quantity": record.quantity,
        }),
    );

    (
        StatusCode::CREATED,
        Json(dto::record_to_json(&record, product.as_ref())),
    )
        .into_response()
}

pub async fn get_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::INVENTORY_READ) {
        return errors::authz_error_to_response(e);
    }
    let id: RecordId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid record id")
        }
    };

    let record = match services.store().find_record(id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "record not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    // Out-of-scope rows read as absent rather than leaking their existence.
    if !authz::can_view_location(&principal, &record.location) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "record not found");
    }

    let product = match services.store().find_product(record.product_id).await {
        Ok(product) => product,
        Err(e) => return errors::store_error_to_response(e),
    };
    (
        StatusCode::OK,
        Json(dto::record_to_json(&record, product.as_ref())),
    )
        .into_response()
}

pub async fn update_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateRecordRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::INVENTORY_WRITE) {
        return errors::authz_error_to_response(e);
    }
    let id: RecordId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid record id")
        }
    };

    let record = match services.store().find_record(id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "record not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = authz::require_location(&principal, &record.location) {
        return errors::authz_error_to_response(e);
    }

    // A `location` naming somewhere else (or arriving with a quantity
    // snapshot) is a reassignment; anything else is a plain field update.
    let destination = match body.location.as_deref() {
        Some(raw) => match Location::parse(raw) {
            Ok(location) => Some(location),
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => None,
    };
    let reassign_to =
        destination.filter(|d| *d != record.location || body.original_quantity.is_some());

    if let Some(destination) = reassign_to {
        if let Err(e) = authz::require_location(&principal, &destination) {
            return errors::authz_error_to_response(e);
        }
        let Some(quantity) = body.quantity else {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "quantity is required when changing location",
            );
        };

        let outcome = match services
            .store()
            .reassign(id, destination, quantity, body.original_quantity)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return errors::store_error_to_response(e),
        };

        if let ReassignOutcome::Moved {
            moved,
            source,
            destination,
        } = &outcome
        {
            services.publish(
                "inventory.updated",
                &destination.location,
                serde_json::json!({
                    "kind": "reassigned",
                    "recordId": id.to_string(),
                    "from": record.location.as_str(),
                    "to": destination.location.as_str(),
                    "moved": moved,
                    "sourceRemaining": source.as_ref().map(|s| s.quantity),
                }),
            );
        }

        let primary = outcome.primary();
        let product = match services.store().find_product(primary.product_id).await {
            Ok(product) => product,
            Err(e) => return errors::store_error_to_response(e),
        };
        return (
            StatusCode::OK,
            Json(dto::record_to_json(primary, product.as_ref())),
        )
            .into_response();
    }

    let changes = RecordChanges {
        quantity: body.quantity,
        minimum_stock_level: body.minimum_stock_level,
    };
    let product_changes = ProductChanges {
        name: body.name,
        category: body.category,
        price: body.price,
        cost_price: body.cost_price,
        active: None,
    };

    let record = match services
        .store()
        .update_record(id, changes, product_changes)
        .await
    {
        Ok(record) => record,
        Err(e) => return errors::store_error_to_response(e),
    };
    let product = match services.store().find_product(record.product_id).await {
        Ok(product) => product,
        Err(e) => return errors::store_error_to_response(e),
    };

    services.publish(
        "inventory.updated",
        &record.location,
        serde_json::json!({
            "kind": "record_updated",
            "recordId": record.id.to_string(),
            "location": record.location.as_str(),
            "quantity": record.quantity,
        }),
    );

    (
        StatusCode::OK,
        Json(dto::record_to_json(&record, product.as_ref())),
    )
        .into_response()
}

pub async fn delete_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::INVENTORY_WRITE) {
        return errors::authz_error_to_response(e);
    }
    let id: RecordId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid record id")
        }
    };

    let record = match services.store().find_record(id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "record not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = authz::require_location(&principal, &record.location) {
        return errors::authz_error_to_response(e);
    }

    let deletion = match services.store().delete_record(id).await {
        Ok(deletion) => deletion,
        Err(e) => return errors::store_error_to_response(e),
    };

    services.publish(
        "inventory.updated",
        &record.location,
        serde_json::json!({
            "kind": "record_deleted",
            "recordId": id.to_string(),
            "location": record.location.as_str(),
            "returnedToPool": deletion.returned_to.is_some(),
            "productRemoved": deletion.product_removed,
        }),
    );

    let message = match (&deletion.returned_to, deletion.product_removed) {
        (Some(_), _) => "record deleted; stock returned to the Unassigned pool",
        (None, true) => "record deleted; product removed with its last record",
        (None, false) => "record deleted",
    };
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": message })),
    )
        .into_response()
}
