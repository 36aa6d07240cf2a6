//! Notification type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One alert surfaced to the operator.
///
/// Never persisted; the list lives only for the current session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Creation instant. Display only ("time ago"); list order is
    /// insertion order, not timestamp order.
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

/// Source category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Message,
    System,
}

/// The caller-supplied part of a notification; id and timestamp are
/// assigned at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub read: bool,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl Notification {
    /// Materialize a notification from its caller-supplied fields.
    pub fn create(new: NewNotification) -> Self {
        Self {
            id: nanoid::nanoid!(),
            title: new.title,
            body: new.body,
            timestamp: Utc::now(),
            read: new.read,
            kind: new.kind,
        }
    }
}

impl NewNotification {
    /// A message notification with `read: false`.
    pub fn message(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            read: false,
            kind: NotificationKind::Message,
        }
    }
}
