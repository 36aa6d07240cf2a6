use std::time::Duration;

use tokio::time::sleep;

use crate::app::SharedState;
use crate::notification::alerts;

pub async fn graceful_shutdown(state: &SharedState) {
    tracing::info!("Shutdown sequence started");

    state.shutdown_token().cancel();
    tracing::info!("Shutdown: background loops cancelled");

    if let Some(tx) = state.take_feed_shutdown().await {
        if tx.send(()).await.is_ok() {
            tracing::info!("Shutdown: feed stop signal sent");
        } else {
            tracing::warn!("Shutdown: failed to send feed stop signal");
        }
    }

    alerts::close().await;
    tracing::info!("Shutdown: alert worker closed");

    sleep(Duration::from_millis(200)).await;
    tracing::info!("Shutdown sequence completed");
}
