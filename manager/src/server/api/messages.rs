//! Message collection endpoints.
//!
//! Mutations go through the document gateway; the mirror catches up
//! when the feed emits the resulting change.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use feed_client::{MessageStatus, writer::DocumentWriter};
use serde_json::{Value, json};

use super::err_json;
use crate::app::SharedState;

/// GET /api/messages
pub async fn get_messages(State(state): State<SharedState>) -> Json<Value> {
    let (messages, loading, error) = state.inbox().snapshot().await;
    Json(json!({
        "messages": messages,
        "loading": loading,
        "error": error,
    }))
}

/// GET /api/messages/stats
pub async fn get_stats(State(state): State<SharedState>) -> Json<Value> {
    let stats = state.inbox().stats().await;
    Json(json!(stats))
}

/// POST /api/messages/{id}/read
pub async fn mark_message_read(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let writer = writer_for(&state).await?;
    writer
        .set_status(&id, MessageStatus::Read)
        .await
        .map_err(|e| err_json(502, &format!("Failed to mark message read: {e}")))?;
    Ok(Json(json!({ "status": "ok" })))
}

/// DELETE /api/messages/{id}
pub async fn delete_message(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let writer = writer_for(&state).await?;
    writer
        .delete(&id)
        .await
        .map_err(|e| err_json(502, &format!("Failed to delete message: {e}")))?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn writer_for(
    state: &SharedState,
) -> Result<DocumentWriter, (StatusCode, Json<Value>)> {
    let config = state.config().await;
    if config.feed_api_url.is_empty() {
        return Err(err_json(503, "FEED_API_URL not configured"));
    }
    DocumentWriter::new(&config.feed_api_url, config.feed_collection.clone())
        .map_err(|e| err_json(500, &format!("Invalid gateway URL: {e}")))
}
