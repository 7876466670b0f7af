//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use michi_shared::DisplayUpdate;

use crate::{
    infrastructure::dto::http::{ErrorBody, IngestAck, parse_ingest_body},
    ui::state::AppState,
};

/// Ingest a batch of classified samples
///
/// The body is parsed here rather than by the `Json` extractor so that a rejected body comes
/// back as 422 with the offending value in it.
pub async fn ingest_batch(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<IngestAck>, (StatusCode, Json<ErrorBody>)> {
    let batch = parse_ingest_body(&body).map_err(|e| {
        tracing::warn!("Rejected ingest body: {}", e);
        (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody::from(&e)))
    })?;

    let outcome = state
        .ingest_batch_usecase
        .execute(batch)
        .await
        .map_err(|e| {
            tracing::error!("Ingest failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("storage error", e.to_string())),
            )
        })?;

    tracing::info!(
        "Ingested {} record(s), pushed to {} subscriber(s)",
        outcome.saved,
        outcome.report.delivered
    );
    Ok(Json(IngestAck::ok(outcome.saved)))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint returning the tuple the next tick will broadcast
pub async fn latest_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DisplayUpdate>, StatusCode> {
    match state.broadcast_latest_usecase.latest().await {
        Ok(Some(update)) => Ok(Json(update)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to read latest state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
