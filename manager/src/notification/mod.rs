//! Operator notification system.
//!
//! The center owns the in-memory list; the alert worker surfaces
//! system-level alerts when permission allows.

pub mod alerts;
pub mod center;
pub mod types;

use push_client::PermissionState;

use crate::app::SharedState;

pub use center::NotificationCenter;
pub use types::{NewNotification, Notification};

/// Initialize the notification system.
pub async fn initialize(state: &SharedState) {
    if !state.config().await.notifications_enabled {
        tracing::info!("Notification system disabled");
        return;
    }

    alerts::start_worker(state.clone()).await;
    tracing::info!("Notification system initialized");
}

/// Record a notification and, when permission is granted, request a
/// system-level alert for it.
pub async fn publish(state: &SharedState, new: NewNotification) -> Notification {
    let entry = state.notifications().add(new).await;

    if state.push().permission().await == PermissionState::Granted {
        let alert = alerts::SystemAlert {
            title: entry.title.clone(),
            body: entry.body.clone(),
            tag: alerts::MESSAGE_TAG.to_string(),
        };
        if let Err(e) = alerts::enqueue(alert).await {
            tracing::debug!(error = %e, "System alert not shown");
        }
    }

    entry
}
