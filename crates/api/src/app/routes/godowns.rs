use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockmaster_auth::permissions;
use stockmaster_core::GodownId;
use stockmaster_locations::{GodownChanges, NewGodown};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_godowns).post(create_godown))
        .route(
            "/:id",
            get(get_godown).put(update_godown).delete(delete_godown),
        )
}

pub async fn list_godowns(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::GODOWNS_READ) {
        return errors::authz_error_to_response(e);
    }
    match services.store().list_godowns().await {
        Ok(godowns) => {
            let body: Vec<_> = godowns.iter().map(dto::godown_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!(body))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_godown(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateLocationRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::GODOWNS_WRITE) {
        return errors::authz_error_to_response(e);
    }
    let new = NewGodown {
        name: body.name,
        address: body.address.unwrap_or_default(),
        city: body.city.unwrap_or_default(),
    };
    match services.store().create_godown(new).await {
        Ok(godown) => (StatusCode::CREATED, Json(dto::godown_to_json(&godown))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_godown(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::GODOWNS_READ) {
        return errors::authz_error_to_response(e);
    }
    let id: GodownId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid godown id")
        }
    };
    match services.store().find_godown(id).await {
        Ok(Some(godown)) => (StatusCode::OK, Json(dto::godown_to_json(&godown))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "godown not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_godown(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateLocationRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::GODOWNS_WRITE) {
        return errors::authz_error_to_response(e);
    }
    let id: GodownId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid godown id")
        }
    };
    let changes = GodownChanges {
        address: body.address,
        city: body.city,
    };
    match services.store().update_godown(id, changes).await {
        Ok(godown) => (StatusCode::OK, Json(dto::godown_to_json(&godown))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_godown(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::GODOWNS_WRITE) {
        return errors::authz_error_to_response(e);
    }
    let id: GodownId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid godown id")
        }
    };
    match services.store().delete_godown(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "godown deleted" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
