use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockmaster_auth::permissions;
use stockmaster_core::ShopId;
use stockmaster_locations::{NewShop, ShopChanges};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_shops).post(create_shop))
        .route("/:id", get(get_shop).put(update_shop).delete(delete_shop))
}

pub async fn list_shops(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::SHOPS_READ) {
        return errors::authz_error_to_response(e);
    }
    match services.store().list_shops().await {
        Ok(shops) => {
            let body: Vec<_> = shops.iter().map(dto::shop_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!(body))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_shop(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateLocationRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::SHOPS_WRITE) {
        return errors::authz_error_to_response(e);
    }
    let new = NewShop {
        name: body.name,
        address: body.address.unwrap_or_default(),
        city: body.city.unwrap_or_default(),
    };
    match services.store().create_shop(new).await {
        Ok(shop) => (StatusCode::CREATED, Json(dto::shop_to_json(&shop))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_shop(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::SHOPS_READ) {
        return errors::authz_error_to_response(e);
    }
    let id: ShopId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid shop id")
        }
    };
    match services.store().find_shop(id).await {
        Ok(Some(shop)) => (StatusCode::OK, Json(dto::shop_to_json(&shop))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "shop not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_shop(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateLocationRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::SHOPS_WRITE) {
        return errors::authz_error_to_response(e);
    }
    let id: ShopId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid shop id")
        }
    };
    let changes = ShopChanges {
        address: body.address,
        city: body.city,
    };
    match services.store().update_shop(id, changes).await {
        Ok(shop) => (StatusCode::OK, Json(dto::shop_to_json(&shop))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_shop(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::SHOPS_WRITE) {
        return errors::authz_error_to_response(e);
    }
    let id: ShopId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid shop id")
        }
    };
    match services.store().delete_shop(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "shop deleted" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
