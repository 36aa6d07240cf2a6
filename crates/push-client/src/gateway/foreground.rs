//! Foreground message stream over the gateway WebSocket.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use url::Url;

use crate::{ForegroundStream, PushError, PushPayload};

const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum StreamFrame {
    Push { payload: PushPayload },
    Keepalive,
}

/// Open the stream. The connection is single-shot: when it drops, the
/// receiver closes and the caller decides whether to reconnect.
pub(super) async fn open(base: &Url, token: &str) -> Result<ForegroundStream, PushError> {
    let mut url = base.join("v1/stream")?;
    match url.scheme() {
        "http" => url.set_scheme("ws").ok(),
        "https" => url.set_scheme("wss").ok(),
        _ => None,
    };
    url.query_pairs_mut().append_pair("token", token);

    tracing::info!("Connecting to push foreground stream");
    let (ws, _) = connect_async(url.as_str()).await?;

    let (payload_tx, payload_rx) = mpsc::channel::<PushPayload>(64);
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(read_loop(ws, payload_tx, shutdown_rx));

    Ok(ForegroundStream {
        payloads: payload_rx,
        shutdown: shutdown_tx,
    })
}

async fn read_loop(
    mut ws: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    payload_tx: mpsc::Sender<PushPayload>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    use tokio_tungstenite::tungstenite::Message as Msg;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("Foreground stream unsubscribed");
                let _ = ws.close(None).await;
                return;
            }
            result = tokio::time::timeout(KEEPALIVE_TIMEOUT * 2, ws.next()) => {
                match result {
                    Ok(Some(Ok(Msg::Text(text)))) => {
                        match serde_json::from_str::<StreamFrame>(&text) {
                            Ok(StreamFrame::Push { payload }) => {
                                tracing::debug!("Foreground push received");
                                if payload_tx.send(payload).await.is_err() {
                                    return;
                                }
                            }
                            Ok(StreamFrame::Keepalive) => {
                                tracing::trace!("Foreground keepalive received");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Unparseable foreground frame dropped");
                            }
                        }
                    }
                    Ok(Some(Ok(Msg::Ping(data)))) => {
                        let _ = ws.send(Msg::Pong(data)).await;
                    }
                    Ok(Some(Ok(Msg::Close(_)))) | Ok(None) => {
                        tracing::warn!("Foreground stream closed by gateway");
                        return;
                    }
                    Ok(Some(Err(e))) => {
                        tracing::warn!(error = %e, "Foreground stream error");
                        return;
                    }
                    Ok(Some(Ok(_))) => {}
                    Err(_) => {
                        tracing::warn!("Foreground stream keepalive timeout");
                        return;
                    }
                }
            }
        }
    }
}
