//! Broadcast event constants and helpers.
//!
//! These events fan out to every connected dashboard client over the
//! WebSocket broadcast channel; the presentation layer renders the
//! state they carry.

use serde::Serialize;

use crate::notification::types::Notification;

// -- Event name constants --

pub const NOTIFICATION_ADDED: &str = "notification_added";
pub const NOTIFICATIONS_UPDATED: &str = "notifications_updated";
pub const MESSAGES_UPDATED: &str = "messages_updated";
pub const FEED_ERROR: &str = "feed_error";
pub const SYSTEM_ALERT: &str = "system_alert";
pub const SYSTEM_ALERT_HIDE: &str = "system_alert_hide";
pub const PERMISSION_CHANGED: &str = "permission_changed";

// -- Payload types --

#[derive(Debug, Clone, Serialize)]
pub struct NotificationListPayload {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesUpdatedPayload {
    pub total: usize,
    pub unread: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionPayload {
    pub permission: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertPayload {
    pub title: String,
    pub body: String,
    pub tag: String,
}

/// Envelope every broadcast message uses: `{"type": ..., "data": ...}`.
pub fn envelope(event: &str, data: impl Serialize) -> String {
    serde_json::json!({ "type": event, "data": data }).to_string()
}
