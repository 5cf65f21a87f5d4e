//! User administration (superadmin only).

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockmaster_auth::{permissions, NewUser, UserChanges};
use stockmaster_core::UserId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::USERS_MANAGE) {
        return errors::authz_error_to_response(e);
    }
    match services.store().list_users().await {
        Ok(users) => {
            let body: Vec<_> = users.iter().map(dto::user_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!(body))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::USERS_MANAGE) {
        return errors::authz_error_to_response(e);
    }
    let new = NewUser {
        email: body.email,
        display_name: body.display_name,
        role: body.role,
        location: body.location,
    };
    match services.store().create_user(new).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::USERS_MANAGE) {
        return errors::authz_error_to_response(e);
    }
    let id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };
    match services.store().find_user(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::USERS_MANAGE) {
        return errors::authz_error_to_response(e);
    }
    let id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };
    let changes = UserChanges {
        email: body.email,
        display_name: body.display_name,
        role: body.role,
        location: body.location.map(Some),
        active: body.active,
    };
    match services.store().update_user(id, changes).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&principal, permissions::USERS_MANAGE) {
        return errors::authz_error_to_response(e);
    }
    let id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };
    match services.store().delete_user(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "user deleted" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
