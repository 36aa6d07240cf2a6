//! Message manager server binary.
//!
//! Starts the dashboard server, the feed and push pumps, the notifier,
//! and signal handling.

use std::sync::Arc;

use push_client::{PushGateway, PushTransport, UnsupportedTransport};
use tracing_subscriber::EnvFilter;

use message_manager_lib::app::SharedState;
use message_manager_lib::{notification, notifier, server, shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting message manager");

    let (db, config, dir) = message_manager_lib::init_foundation()?;
    let transport: Arc<dyn PushTransport> = if config.push_gateway_url.is_empty() {
        tracing::warn!("PUSH_GATEWAY_URL not configured; push messaging disabled");
        Arc::new(UnsupportedTransport)
    } else {
        Arc::new(PushGateway::new(&config.push_gateway_url, &config.device_id)?)
    };
    let state = SharedState::new(db, config, dir, transport);

    // Web server
    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    // Alert worker
    notification::initialize(&state).await;

    // Notifier: both sources converge on one channel
    let (source_tx, source_rx) = notifier::source_channel();

    let s = state.clone();
    tokio::spawn(async move { notifier::run(s, source_rx).await });

    let s = state.clone();
    let tx = source_tx.clone();
    tokio::spawn(async move { notifier::run_feed_pump(s, tx).await });

    let s = state.clone();
    tokio::spawn(async move { notifier::run_push_pump(s, source_tx).await });

    tracing::info!(
        port = state.server_port(),
        "Message manager running. Press Ctrl+C to stop."
    );

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    shutdown::graceful_shutdown(&state).await;
    server_handle.abort();
    Ok(())
}
