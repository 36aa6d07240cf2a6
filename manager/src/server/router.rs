use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;

use super::{api, websocket};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        .route("/ws", get(websocket::ws_handler))
        // --- Notifications ---
        .route(
            "/api/notifications",
            get(api::notifications::get_notifications)
                .post(api::notifications::add_notification)
                .delete(api::notifications::clear_notifications),
        )
        .route(
            "/api/notifications/read-all",
            post(api::notifications::mark_all_read),
        )
        .route(
            "/api/notifications/{id}/read",
            post(api::notifications::mark_read),
        )
        .route(
            "/api/notifications/{id}",
            delete(api::notifications::clear_notification),
        )
        .route("/api/alerts/dismiss", post(api::notifications::dismiss_alert))
        // --- Settings ---
        .route(
            "/api/settings",
            get(api::settings::get_settings).put(api::settings::update_settings),
        )
        // --- Push ---
        .route(
            "/api/push/permission",
            get(api::push::get_permission).post(api::push::request_permission),
        )
        .route("/api/push/subscribe", post(api::push::subscribe))
        // --- Messages ---
        .route("/api/messages", get(api::messages::get_messages))
        .route("/api/messages/stats", get(api::messages::get_stats))
        .route("/api/messages/{id}/read", post(api::messages::mark_message_read))
        .route("/api/messages/{id}", delete(api::messages::delete_message))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /status
async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "message-manager",
    }))
}
