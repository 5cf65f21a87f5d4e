use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;
use stockmaster_auth::{JwtClaims, Role};
use stockmaster_core::UserId;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = stockmaster_api::app::build_app(jwt_secret.to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, role: Role, location: Option<&str>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        role,
        location: location.map(str::to_string),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_entry(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    location: &str,
    quantity: i64,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/inventory", base_url))
        .bearer_auth(token)
        .json(&json!({
            "name": "Basmati Rice 5kg",
            "sku": "RICE-5KG",
            "category": "Grains",
            "location": location,
            "quantity": quantity,
            "unit": "bags",
            "minimumStockLevel": 10,
            "price": 1299,
            "costPrice": 950,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn list_inventory(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> Vec<serde_json::Value> {
    let res = client
        .get(format!("{}/inventory", base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn principal_context_is_derived_from_token() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, Role::Godownadmin, Some("Central Godown"));

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "godownadmin");
    assert_eq!(body["location"], "Central Godown");
}

#[tokio::test]
async fn reassignment_lifecycle_over_http() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, Role::Superadmin, None);
    let client = reqwest::Client::new();

    // 100 units into the pool.
    let created = create_entry(&client, &srv.base_url, &token, "Unassigned", 100).await;
    let source_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "In Stock");
    assert_eq!(created["sku"], "RICE-5KG");

    // Move 30 to Warehouse A: source splits 70/30.
    let res = client
        .put(format!("{}/inventory/{}", srv.base_url, source_id))
        .bearer_auth(&token)
        .json(&json!({ "location": "Warehouse A", "quantity": 30 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let dest: serde_json::Value = res.json().await.unwrap();
    assert_eq!(dest["location"], "Warehouse A");
    assert_eq!(dest["quantity"], 30);
    let dest_id = dest["id"].as_str().unwrap().to_string();
    assert_ne!(dest_id, source_id);

    let records = list_inventory(&client, &srv.base_url, &token).await;
    assert_eq!(records.len(), 2);
    let total: i64 = records.iter().map(|r| r["quantity"].as_i64().unwrap()).sum();
    assert_eq!(total, 100);

    // Moving 80 out of the 70-unit source is rejected, state unchanged.
    let res = client
        .put(format!("{}/inventory/{}", srv.base_url, source_id))
        .bearer_auth(&token)
        .json(&json!({ "location": "Warehouse A", "quantity": 80 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_quantity");

    let records = list_inventory(&client, &srv.base_url, &token).await;
    let total: i64 = records.iter().map(|r| r["quantity"].as_i64().unwrap()).sum();
    assert_eq!(total, 100);

    // Full move of the remaining 70 removes the source and merges into the
    // destination row.
    let res = client
        .put(format!("{}/inventory/{}", srv.base_url, source_id))
        .bearer_auth(&token)
        .json(&json!({ "location": "Warehouse A", "quantity": 70 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let merged: serde_json::Value = res.json().await.unwrap();
    assert_eq!(merged["id"], dest_id.as_str());
    assert_eq!(merged["quantity"], 100);

    let res = client
        .get(format!("{}/inventory/{}", srv.base_url, source_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let records = list_inventory(&client, &srv.base_url, &token).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["quantity"], 100);
}

#[tokio::test]
async fn stale_snapshot_yields_conflict() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, Role::Superadmin, None);
    let client = reqwest::Client::new();

    let created = create_entry(&client, &srv.base_url, &token, "Unassigned", 100).await;
    let id = created["id"].as_str().unwrap();

    // Client thinks the row has 80 units; it has 100.
    let res = client
        .put(format!("{}/inventory/{}", srv.base_url, id))
        .bearer_auth(&token)
        .json(&json!({
            "location": "Warehouse A",
            "quantity": 30,
            "originalQuantity": 80,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // No partial write happened.
    let records = list_inventory(&client, &srv.base_url, &token).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["quantity"], 100);
}

#[tokio::test]
async fn delete_returns_stock_to_pool() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, Role::Superadmin, None);
    let client = reqwest::Client::new();

    create_entry(&client, &srv.base_url, &token, "Unassigned", 60).await;
    let assigned = create_entry(&client, &srv.base_url, &token, "Warehouse A", 40).await;
    let assigned_id = assigned["id"].as_str().unwrap();

    let res = client
        .delete(format!("{}/inventory/{}", srv.base_url, assigned_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Unassigned"));

    let records = list_inventory(&client, &srv.base_url, &token).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["location"], "Unassigned");
    assert_eq!(records[0]["quantity"], 100);
}

#[tokio::test]
async fn location_admins_are_scoped() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let superadmin = mint_jwt(jwt_secret, Role::Superadmin, None);
    let godown_admin = mint_jwt(jwt_secret, Role::Godownadmin, Some("Warehouse A"));
    let client = reqwest::Client::new();

    // Stock in two locations, created by the superadmin.
    let in_scope = create_entry(&client, &srv.base_url, &superadmin, "Warehouse A", 40).await;
    let res = client
        .post(format!("{}/inventory", srv.base_url))
        .bearer_auth(&superadmin)
        .json(&json!({
            "name": "Sugar 1kg",
            "sku": "SUGAR-1KG",
            "location": "North Shop",
            "quantity": 25,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let out_of_scope: serde_json::Value = res.json().await.unwrap();

    // Listing only shows rows in scope (plus the pool).
    let records = list_inventory(&client, &srv.base_url, &godown_admin).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["location"], "Warehouse A");

    // Out-of-scope rows read as absent.
    let res = client
        .get(format!(
            "{}/inventory/{}",
            srv.base_url,
            out_of_scope["id"].as_str().unwrap()
        ))
        .bearer_auth(&godown_admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Writing into someone else's location is forbidden.
    let res = client
        .post(format!("{}/inventory", srv.base_url))
        .bearer_auth(&godown_admin)
        .json(&json!({
            "name": "Sugar 1kg",
            "sku": "SUGAR-1KG",
            "location": "North Shop",
            "quantity": 5,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Moving own stock back to the pool is allowed.
    let res = client
        .put(format!(
            "{}/inventory/{}",
            srv.base_url,
            in_scope["id"].as_str().unwrap()
        ))
        .bearer_auth(&godown_admin)
        .json(&json!({ "location": "Unassigned", "quantity": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Entity administration stays superadmin-only.
    let res = client
        .get(format!("{}/users", srv.base_url))
        .bearer_auth(&godown_admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn godown_directory_crud() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, Role::Superadmin, None);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/godowns", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Central Godown", "city": "Karachi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let godown: serde_json::Value = res.json().await.unwrap();

    // Duplicate location names are rejected across kinds.
    let res = client
        .post(format!("{}/shops", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Central Godown" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // A godown holding stock cannot be deleted.
    create_entry(&client, &srv.base_url, &token, "Central Godown", 10).await;
    let res = client
        .delete(format!(
            "{}/godowns/{}",
            srv.base_url,
            godown["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn user_administration_lifecycle() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, Role::Superadmin, None);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/users", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "email": "g@example.com",
            "displayName": "Godown Admin",
            "role": "godownadmin",
            "location": "Central Godown",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let user: serde_json::Value = res.json().await.unwrap();
    assert_eq!(user["role"], "godownadmin");

    // A scoped role without a location is a validation error.
    let res = client
        .post(format!("{}/users", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "email": "s@example.com",
            "displayName": "Shop Admin",
            "role": "shopadmin",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(format!(
            "{}/users/{}",
            srv.base_url,
            user["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
