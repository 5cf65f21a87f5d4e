use std::sync::Arc;

use tokio::sync::broadcast;

use stockmaster_inventory::Location;
use stockmaster_store::{MemoryStockStore, PgStockStore, StockStore};

/// Realtime message broadcasted via SSE.
///
/// Carries the affected location so the stream handler can filter by the
/// subscriber's scope.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StockEvent {
    pub topic: String,
    pub location: String,
    pub payload: serde_json::Value,
}

/// Store + realtime wiring shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn StockStore>,
    realtime_tx: broadcast::Sender<StockEvent>,
}

impl AppServices {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        // Lossy broadcast; slow SSE subscribers drop messages rather than
        // backpressuring writes.
        let (realtime_tx, _) = broadcast::channel::<StockEvent>(256);
        Self { store, realtime_tx }
    }

    pub fn store(&self) -> &dyn StockStore {
        self.store.as_ref()
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<StockEvent> {
        &self.realtime_tx
    }

    pub fn publish(&self, topic: &str, location: &Location, payload: serde_json::Value) {
        let _ = self.realtime_tx.send(StockEvent {
            topic: topic.to_string(),
            location: location.as_str().to_string(),
            payload,
        });
    }
}

/// Select the store backend from the environment.
///
/// `USE_PERSISTENT_STORES=true` + `DATABASE_URL` selects Postgres; the
/// default is the in-memory store (dev/test).
pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        let pool = sqlx::PgPool::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");
        let store = PgStockStore::new(pool);
        store
            .ensure_schema()
            .await
            .expect("failed to ensure database schema");
        tracing::info!("using Postgres stock store");
        AppServices::new(Arc::new(store))
    } else {
        tracing::info!("using in-memory stock store");
        AppServices::new(Arc::new(MemoryStockStore::new()))
    }
}
