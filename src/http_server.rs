use crate::error::ValidationError;
use crate::types::WebhookPayload;
use crate::validation::ReleaseDateValidator;
use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Clone)]
struct ServerState {
    validator: Arc<ReleaseDateValidator>,
}

pub fn router(validator: Arc<ReleaseDateValidator>) -> Router {
    Router::new()
        .route("/api/validate", post(handle_validate))
        .with_state(ServerState { validator })
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn run(addr: SocketAddr, validator: Arc<ReleaseDateValidator>) -> Result<(), String> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("failed to bind HTTP server on {addr}: {e}"))?;

    let local = listener
        .local_addr()
        .map_err(|e| format!("failed to read bound address: {e}"))?;
    tracing::info!(%local, "release-date-guard listening");

    axum::serve(listener, router(validator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("HTTP server error: {e}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn handle_validate(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), ValidationError> {
    let delivery_id = Uuid::new_v4();
    let span = tracing::info_span!("delivery", %delivery_id);

    async move {
        // Unknown fields are ignored; anything that is not a JSON object is rejected.
        let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!("malformed payload: {e}");
            ValidationError::bad_request("Malformed payload")
        })?;

        let outcome = state.validator.validate(&payload).await?;
        Ok((outcome.status_code(), outcome.message()))
    }
    .instrument(span)
    .await
}
