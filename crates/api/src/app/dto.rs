use serde::Deserialize;

use stockmaster_auth::User;
use stockmaster_inventory::InventoryRecord;
use stockmaster_locations::{Godown, Shop};
use stockmaster_products::Product;

// -------------------------
// Request DTOs
// -------------------------

/// `POST /inventory` — new stock entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Defaults to the Unassigned pool.
    #[serde(default)]
    pub location: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub minimum_stock_level: Option<i64>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub cost_price: Option<i64>,
}

/// `PUT /inventory/:id` — plain field update, or a reassignment when
/// `location` names somewhere other than the record's current location.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    pub quantity: Option<i64>,
    pub minimum_stock_level: Option<i64>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub cost_price: Option<i64>,
    pub category: Option<String>,
    /// Client-observed source quantity. Only used to detect a stale view
    /// (409); never used for arithmetic.
    pub original_quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub cost_price: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub cost_price: Option<i64>,
    pub active: Option<bool>,
}

/// Shared by godowns and shops.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub role: stockmaster_auth::Role,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<stockmaster_auth::Role>,
    pub location: Option<String>,
    pub active: Option<bool>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// Flat record shape from the wire contract. `sku`/`category` are joined in
/// from the owning product; `status` is derived.
pub fn record_to_json(record: &InventoryRecord, product: Option<&Product>) -> serde_json::Value {
    serde_json::json!({
        "id": record.id.to_string(),
        "name": record.name,
        "sku": product.map(|p| p.sku.as_str()).unwrap_or_default(),
        "category": product.map(|p| p.category.as_str()).unwrap_or_default(),
        "location": record.location.as_str(),
        "quantity": record.quantity,
        "unit": record.unit,
        "status": record.status().as_str(),
        "lastUpdated": record.last_updated.to_rfc3339(),
        "price": record.price,
        "costPrice": record.cost_price,
        "productId": record.product_id.to_string(),
    })
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id.to_string(),
        "name": product.name,
        "sku": product.sku,
        "category": product.category,
        "price": product.price,
        "costPrice": product.cost_price,
        "active": product.active,
        "createdAt": product.created_at.to_rfc3339(),
        "updatedAt": product.updated_at.to_rfc3339(),
    })
}

pub fn godown_to_json(godown: &Godown) -> serde_json::Value {
    serde_json::json!({
        "id": godown.id.to_string(),
        "name": godown.name,
        "address": godown.address,
        "city": godown.city,
        "createdAt": godown.created_at.to_rfc3339(),
        "updatedAt": godown.updated_at.to_rfc3339(),
    })
}

pub fn shop_to_json(shop: &Shop) -> serde_json::Value {
    serde_json::json!({
        "id": shop.id.to_string(),
        "name": shop.name,
        "address": shop.address,
        "city": shop.city,
        "createdAt": shop.created_at.to_rfc3339(),
        "updatedAt": shop.updated_at.to_rfc3339(),
    })
}

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "email": user.email,
        "displayName": user.display_name,
        "role": user.role.as_str(),
        "location": user.location,
        "active": user.active,
    })
}
