use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(principal): Extension<PrincipalContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "userId": principal.user_id().to_string(),
        "role": principal.role().as_str(),
        "location": principal.scope().location(),
    }))
}

/// SSE feed of stock change notifications, filtered to the caller's scope.
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let scope = principal.scope().clone();
    let rx = services.realtime_tx().subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m)
            if m.location == stockmaster_inventory::Location::UNASSIGNED
                || scope.allows(&m.location) =>
        {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
