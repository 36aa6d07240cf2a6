//! Settings endpoints.

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use super::err_json;
use crate::app::SharedState;
use crate::config::{SettingType, SettingsManager};

/// GET /api/settings. Secret values are masked.
pub async fn get_settings(
    State(state): State<SharedState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let sm = SettingsManager::new(state.db().clone());
    let mut settings = sm
        .get_all_settings()
        .map_err(|e| err_json(500, &format!("Failed to load settings: {e}")))?;

    for info in settings.values_mut() {
        if info.setting_type == SettingType::Secret && info.has_value {
            info.value = String::new();
        }
    }

    Ok(Json(json!({ "settings": settings })))
}

/// PUT /api/settings. Partial update, then reload runtime config.
pub async fn update_settings(
    State(state): State<SharedState>,
    Json(body): Json<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let sm = SettingsManager::new(state.db().clone());

    for (key, value) in &body {
        if let Err(e) = sm.set_setting(key, value) {
            tracing::warn!("Failed to set setting {key}: {e}");
        }
    }

    state
        .reload_config()
        .await
        .map_err(|e| err_json(500, &format!("Failed to reload config: {e}")))?;

    Ok(Json(json!({ "status": "ok" })))
}
