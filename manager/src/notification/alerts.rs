//! System-level alert queue and worker.
//!
//! Shows one alert at a time to the presentation layer. Alerts sharing
//! a tag replace the visible alert instead of stacking; every alert
//! self-dismisses after the configured duration and dismisses
//! immediately on user interaction.

use std::sync::LazyLock;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc};
use tokio::time::timeout;

use crate::app::SharedState;
use crate::events;

const QUEUE_CAPACITY: usize = 64;

/// Tag shared by message alerts so repeated arrivals coalesce into one
/// platform notification slot.
pub const MESSAGE_TAG: &str = "message-notification";

/// A request to surface a system-level alert.
#[derive(Debug, Clone)]
pub struct SystemAlert {
    pub title: String,
    pub body: String,
    pub tag: String,
}

enum AlertCmd {
    Show(SystemAlert),
    Dismiss,
}

static ALERT_TX: LazyLock<RwLock<Option<mpsc::Sender<AlertCmd>>>> =
    LazyLock::new(|| RwLock::new(None));

/// Start the alert worker.
pub async fn start_worker(state: SharedState) {
    let (tx, rx) = mpsc::channel::<AlertCmd>(QUEUE_CAPACITY);
    {
        let mut slot = ALERT_TX.write().await;
        *slot = Some(tx);
    }

    tokio::spawn(worker_loop(state, rx));
    tracing::info!("Alert worker started");
}

/// Enqueue an alert for display.
pub async fn enqueue(alert: SystemAlert) -> Result<(), String> {
    let tx_guard = ALERT_TX.read().await;
    let tx = tx_guard
        .as_ref()
        .ok_or_else(|| "Alert worker not initialized".to_string())?;

    tx.try_send(AlertCmd::Show(alert))
        .map_err(|e| format!("Alert queue full or closed: {e}"))?;

    Ok(())
}

/// Dismiss the visible alert (user interaction).
pub async fn dismiss() {
    let tx_guard = ALERT_TX.read().await;
    if let Some(tx) = tx_guard.as_ref() {
        let _ = tx.try_send(AlertCmd::Dismiss);
    }
}

/// Close the queue sender to stop the worker loop.
pub async fn close() {
    let mut slot = ALERT_TX.write().await;
    *slot = None;
}

/// Worker loop. A newer alert with the same tag replaces the visible
/// one and restarts its timer; a dismiss or the timeout hides it.
async fn worker_loop(state: SharedState, mut rx: mpsc::Receiver<AlertCmd>) {
    while let Some(cmd) = rx.recv().await {
        let AlertCmd::Show(alert) = cmd else {
            // Dismiss with nothing visible
            continue;
        };

        let duration = Duration::from_secs(state.config().await.alert_duration_secs.max(1));
        show_alert(&state, &alert);

        loop {
            match timeout(duration, rx.recv()).await {
                Ok(Some(AlertCmd::Show(newer))) => {
                    // Same tag: replace in place. The envelope carries
                    // the tag either way, so presentation swaps slots.
                    show_alert(&state, &newer);
                }
                Ok(Some(AlertCmd::Dismiss)) => break,
                _ => break, // Timeout or channel closed
            }
        }

        hide_alert(&state);
    }

    tracing::info!("Alert worker stopped");
}

fn show_alert(state: &SharedState, alert: &SystemAlert) {
    let payload = events::AlertPayload {
        title: alert.title.clone(),
        body: alert.body.clone(),
        tag: alert.tag.clone(),
    };
    let _ = state
        .ws_sender()
        .send(events::envelope(events::SYSTEM_ALERT, payload));
}

fn hide_alert(state: &SharedState) {
    let _ = state
        .ws_sender()
        .send(events::envelope(events::SYSTEM_ALERT_HIDE, serde_json::Value::Null));
}
