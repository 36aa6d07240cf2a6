//! Push permission and subscription endpoints.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::app::SharedState;

/// GET /api/push/permission
pub async fn get_permission(State(state): State<SharedState>) -> Json<Value> {
    let permission = state.push().current_permission().await;
    let token_cached = state.push().stored_token().await.is_some();
    Json(json!({
        "permission": permission,
        "token_cached": token_cached,
    }))
}

/// POST /api/push/permission. Trigger the permission flow.
pub async fn request_permission(State(state): State<SharedState>) -> Json<Value> {
    let token = state.push().request_permission().await;
    let permission = state.push().permission().await;
    Json(json!({
        "permission": permission,
        "token": token,
    }))
}

/// POST /api/push/subscribe. Re-affirm the topic association.
pub async fn subscribe(State(state): State<SharedState>) -> Json<Value> {
    let topic = state.push().topic().to_string();
    let subscribed = state.push().ensure_subscribed(&topic).await;
    Json(json!({
        "topic": topic,
        "subscribed": subscribed,
    }))
}
