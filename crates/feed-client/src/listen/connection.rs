use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;

use super::*;

#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    #[serde(rename = "type")]
    frame_type: &'static str,
    collection: &'a str,
    order_by: &'static str,
    direction: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum GatewayFrame {
    Subscribed {
        #[allow(dead_code)]
        subscription_id: Option<String>,
    },
    Snapshot {
        documents: Vec<MessageDoc>,
        #[serde(default)]
        changes: Vec<DocChange>,
    },
    Keepalive,
    Error {
        message: String,
    },
}

impl FeedClient {
    pub(super) async fn connect_once(
        config: &FeedConfig,
        event_tx: &mpsc::Sender<FeedEvent>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<(), FeedError> {
        use tokio_tungstenite::tungstenite::Message as Msg;

        tracing::info!(url = %config.url, collection = %config.collection, "Connecting to document feed");
        let (mut ws, _) = connect_async(&config.url).await?;

        let req = SubscribeRequest {
            frame_type: "subscribe",
            collection: &config.collection,
            order_by: "timestamp",
            direction: "desc",
        };
        ws.send(Msg::Text(serde_json::to_string(&req)?.into()))
            .await?;
        Self::wait_for_subscribed(&mut ws).await?;

        // Each (re)subscription starts a fresh snapshot sequence.
        let _ = event_tx.send(FeedEvent::Subscribed).await;

        let timeout = KEEPALIVE_TIMEOUT * 2;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Feed shutdown during listen");
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                result = tokio::time::timeout(timeout, ws.next()) => {
                    match result {
                        Ok(Some(Ok(Msg::Text(text)))) => {
                            Self::handle_frame(&text, event_tx).await?;
                        }
                        Ok(Some(Ok(Msg::Ping(data)))) => {
                            let _ = ws.send(Msg::Pong(data)).await;
                        }
                        Ok(Some(Ok(Msg::Close(_)))) | Ok(None) => {
                            tracing::warn!("Feed WebSocket closed by server");
                            return Err(FeedError::Feed("Server closed".into()));
                        }
                        Ok(Some(Err(e))) => return Err(FeedError::WebSocket(e)),
                        Ok(Some(Ok(_))) => {}
                        Err(_) => {
                            tracing::warn!("Feed keepalive timeout");
                            return Err(FeedError::Timeout);
                        }
                    }
                }
            }
        }
    }

    async fn wait_for_subscribed(
        ws: &mut tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    ) -> Result<(), FeedError> {
        use tokio_tungstenite::tungstenite::Message as Msg;
        loop {
            match tokio::time::timeout(KEEPALIVE_TIMEOUT, ws.next()).await {
                Ok(Some(Ok(Msg::Text(text)))) => match serde_json::from_str(&text)? {
                    GatewayFrame::Subscribed { .. } => {
                        tracing::info!("Feed subscription confirmed");
                        return Ok(());
                    }
                    GatewayFrame::Error { message } => return Err(FeedError::Feed(message)),
                    _ => continue,
                },
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(e))) => return Err(FeedError::WebSocket(e)),
                Ok(None) => return Err(FeedError::Feed("Connection closed".into())),
                Err(_) => return Err(FeedError::Timeout),
            }
        }
    }

    async fn handle_frame(
        text: &str,
        event_tx: &mpsc::Sender<FeedEvent>,
    ) -> Result<(), FeedError> {
        match serde_json::from_str::<GatewayFrame>(text)? {
            GatewayFrame::Snapshot { documents, changes } => {
                tracing::debug!(
                    documents = documents.len(),
                    changes = changes.len(),
                    "Feed snapshot received"
                );
                let _ = event_tx
                    .send(FeedEvent::Snapshot(FeedUpdate { documents, changes }))
                    .await;
                Ok(())
            }
            GatewayFrame::Keepalive => {
                tracing::trace!("Feed keepalive received");
                Ok(())
            }
            GatewayFrame::Error { message } => {
                tracing::warn!(message = %message, "Feed reported an error");
                Err(FeedError::Feed(message))
            }
            GatewayFrame::Subscribed { .. } => Ok(()),
        }
    }
}
