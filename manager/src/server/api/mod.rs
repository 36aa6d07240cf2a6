pub mod messages;
pub mod notifications;
pub mod push;
pub mod settings;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

/// Build an error response tuple.
pub(crate) fn err_json(status: u16, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "error": message })),
    )
}
