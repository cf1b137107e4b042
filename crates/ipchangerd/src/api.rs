//! HTTP surface of the daemon
//!
//! - `POST /reconnect`: run one reconnect cycle
//!   - `200 OK` with a JSON [`ReconnectResult`](ipchanger_core::ReconnectResult)
//!   - `409 Conflict` (plain text) when a cycle is running and admission is `reject`
//!   - `500 Internal Server Error` (plain text) on any other failure
//! - `POST /`: alias kept for triggers that post to the root path

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use ipchanger_core::{Error, ReconnectOrchestrator};
use std::sync::Arc;
use tracing::{error, info};

/// Build the daemon router
pub fn router(orchestrator: Arc<ReconnectOrchestrator>) -> Router {
    Router::new()
        .route("/reconnect", post(reconnect))
        .route("/", post(reconnect))
        .with_state(orchestrator)
}

async fn reconnect(State(orchestrator): State<Arc<ReconnectOrchestrator>>) -> Response {
    info!("Reconnect requested for {}", orchestrator.interface());

    // Detached from the connection: a client hanging up must not stop a cycle mid-reset
    let cycle = tokio::spawn(async move { orchestrator.reconnect().await });

    match cycle.await {
        Ok(Ok(result)) => (StatusCode::OK, Json(result)).into_response(),
        Ok(Err(Error::Busy)) => (StatusCode::CONFLICT, Error::Busy.to_string()).into_response(),
        Ok(Err(e)) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        Err(e) => {
            error!("Reconnect task aborted: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Reconnect task aborted: {}", e),
            )
                .into_response()
        }
    }
}
