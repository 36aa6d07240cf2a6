//! Notification list endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use crate::app::SharedState;
use crate::notification::{self, NewNotification, alerts};

/// GET /api/notifications
pub async fn get_notifications(State(state): State<SharedState>) -> Json<Value> {
    let (notifications, unread_count) = state.notifications().snapshot().await;
    let permission = state.push().permission().await;
    Json(json!({
        "notifications": notifications,
        "unread_count": unread_count,
        "permission": permission,
    }))
}

/// POST /api/notifications. Inject a notification.
///
/// Lets collaborators surface an alert without constructing one
/// directly; id and timestamp are assigned here.
pub async fn add_notification(
    State(state): State<SharedState>,
    Json(new): Json<NewNotification>,
) -> Json<Value> {
    let entry = notification::publish(&state, new).await;
    Json(json!({ "notification": entry }))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(State(state): State<SharedState>, Path(id): Path<String>) -> Json<Value> {
    state.notifications().mark_read(&id).await;
    Json(json!({ "status": "ok" }))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(State(state): State<SharedState>) -> Json<Value> {
    state.notifications().mark_all_read().await;
    Json(json!({ "status": "ok" }))
}

/// DELETE /api/notifications/{id}
pub async fn clear_notification(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Json<Value> {
    state.notifications().clear(&id).await;
    Json(json!({ "status": "ok" }))
}

/// DELETE /api/notifications
pub async fn clear_notifications(State(state): State<SharedState>) -> Json<Value> {
    state.notifications().clear_all().await;
    Json(json!({ "status": "ok" }))
}

/// POST /api/alerts/dismiss. User interacted with the visible alert.
pub async fn dismiss_alert(State(_state): State<SharedState>) -> Json<Value> {
    alerts::dismiss().await;
    Json(json!({ "status": "ok" }))
}
