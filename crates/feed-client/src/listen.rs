//! Real-time change feed over the message collection.
//!
//! Connects to the document gateway WebSocket, subscribes to the
//! collection ordered by recency, and manages automatic reconnection
//! with exponential backoff.

mod connection;
#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::{DocChange, FeedError, MessageDoc};

const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(30);
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const FAILURE_RESET_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Feed subscription parameters.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket endpoint of the document gateway.
    pub url: String,
    /// Collection to subscribe to.
    pub collection: String,
}

/// One emission of the feed: the full ordered current set of documents
/// plus the per-document changes since the prior emission.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedUpdate {
    pub documents: Vec<MessageDoc>,
    pub changes: Vec<DocChange>,
}

/// An event delivered to the feed consumer.
///
/// `Subscribed` is emitted on every successful (re)subscription, before
/// the first snapshot of that subscription arrives.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Subscribed,
    Snapshot(FeedUpdate),
    Error(String),
}

/// Feed WebSocket client with auto-reconnect.
///
/// Events are delivered via `mpsc::Receiver<FeedEvent>`.
pub struct FeedClient;

impl FeedClient {
    /// Start the feed loop. Returns an event receiver and shutdown sender.
    ///
    /// Sending on the shutdown sender stops the loop; dropping the
    /// receiver has the same effect once the channel fills. Both are
    /// idempotent.
    pub fn connect(config: FeedConfig) -> (mpsc::Receiver<FeedEvent>, mpsc::Sender<()>) {
        let (event_tx, event_rx) = mpsc::channel::<FeedEvent>(256);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(Self::run_loop(config, event_tx, shutdown_rx));
        (event_rx, shutdown_tx)
    }

    async fn run_loop(
        config: FeedConfig,
        event_tx: mpsc::Sender<FeedEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut failures: u32 = 0;
        let mut last_failure_at: Option<Instant> = None;
        loop {
            if shutdown_rx.try_recv().is_ok() {
                tracing::info!("Feed shutdown requested");
                return;
            }
            if let Some(last_failure) = last_failure_at {
                if last_failure.elapsed() >= FAILURE_RESET_WINDOW {
                    if failures > 0 {
                        tracing::info!(failures, "Feed failures reset after stable interval");
                    }
                    failures = 0;
                    last_failure_at = None;
                }
            }
            match Self::connect_once(&config, &event_tx, &mut shutdown_rx).await {
                Ok(()) => {
                    tracing::info!("Feed connection closed cleanly");
                    return;
                }
                Err(e) => {
                    failures += 1;
                    last_failure_at = Some(Instant::now());
                    // Surface the failure so the consumer can flag it
                    // without discarding its cached state.
                    let _ = event_tx.send(FeedEvent::Error(e.to_string())).await;
                    let backoff = Self::backoff_duration(failures);
                    tracing::warn!(
                        error = %e, attempt = failures,
                        backoff_secs = backoff.as_secs(),
                        "Feed connection failed, will reconnect"
                    );
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            tracing::info!("Feed shutdown requested during reconnect backoff");
                            return;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }

    fn backoff_duration(failures: u32) -> Duration {
        let d = BASE_BACKOFF * 2u32.saturating_pow(failures.saturating_sub(1));
        d.min(MAX_BACKOFF)
    }
}
