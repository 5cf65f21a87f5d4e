use axum::{routing::get, Router};

pub mod godowns;
pub mod inventory;
pub mod products;
pub mod shops;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .nest("/inventory", inventory::router())
        .nest("/products", products::router())
        .nest("/godowns", godowns::router())
        .nest("/shops", shops::router())
        .nest("/users", users::router())
}
