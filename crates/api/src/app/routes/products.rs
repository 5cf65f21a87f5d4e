use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockmaster_auth::permissions;
use stockmaster_core::ProductId;
use stockmaster_products::{NewProduct, ProductChanges};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).put(update_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::PRODUCTS_READ) {
        return errors::authz_error_to_response(e);
    }
    match services.store().list_products().await {
        Ok(products) => {
            let body: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!(body))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::PRODUCTS_WRITE) {
        return errors::authz_error_to_response(e);
    }

    let new = NewProduct {
        name: body.name,
        sku: body.sku,
        category: body.category.unwrap_or_default(),
        price: body.price.unwrap_or(0),
        cost_price: body.cost_price.unwrap_or(0),
    };
    match services.store().create_product(new).await {
        Ok(product) => {
            (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::PRODUCTS_READ) {
        return errors::authz_error_to_response(e);
    }
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };
    match services.store().find_product(id).await {
        Ok(Some(product)) => {
            (StatusCode::OK, Json(dto::product_to_json(&product))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::PRODUCTS_WRITE) {
        return errors::authz_error_to_response(e);
    }
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    let changes = ProductChanges {
        name: body.name,
        category: body.category,
        price: body.price,
        cost_price: body.cost_price,
        active: body.active,
    };
    match services.store().update_product(id, changes).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
