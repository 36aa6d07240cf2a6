//! Push transport client library.
//!
//! Wraps the push gateway: permission prompts, registration tokens,
//! topic subscriptions, and the foreground message stream. The
//! [`PushTransport`] trait is the seam the application codes against;
//! [`gateway::PushGateway`] is the production implementation.

pub mod gateway;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub use gateway::PushGateway;

/// Platform notification permission, mirrored from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Default,
    Granted,
    Denied,
}

impl Default for PermissionState {
    fn default() -> Self {
        Self::Default
    }
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

/// Display fields of a push message, when the sender provided any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// A push message payload delivered while the app has focus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationContent>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
}

/// Application credentials presented when registering for push delivery.
#[derive(Debug, Clone, Serialize)]
pub struct AppCredentials {
    pub api_key: String,
    pub sender_id: String,
    pub app_id: String,
    pub vapid_key: String,
}

/// A live foreground message subscription.
///
/// Dropping `shutdown` (or sending on it) ends the stream; both are
/// idempotent and no payloads are delivered afterwards.
pub struct ForegroundStream {
    pub payloads: mpsc::Receiver<PushPayload>,
    pub shutdown: mpsc::Sender<()>,
}

/// Unified error type for the push-client crate.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Push messaging not supported by this gateway")]
    Unsupported,

    #[error("Token fetch failed: {0}")]
    TokenFetch(String),

    #[error("Gateway API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Connection timeout")]
    Timeout,
}

/// The push-messaging collaborator.
///
/// Prompt stickiness lives on the gateway side: once the user decided,
/// `request_permission` reports the decision without re-prompting.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Read the live permission value.
    async fn permission(&self) -> Result<PermissionState, PushError>;

    /// Trigger the user-facing permission prompt if still undecided.
    async fn request_permission(&self) -> Result<PermissionState, PushError>;

    /// Obtain a registration token for this profile.
    async fn fetch_token(&self, credentials: &AppCredentials) -> Result<String, PushError>;

    /// Associate a registration token with a topic. Idempotent.
    async fn subscribe_topic(&self, token: &str, topic: &str) -> Result<(), PushError>;

    /// Open the foreground message stream for a registration token.
    async fn foreground_stream(&self, token: &str) -> Result<ForegroundStream, PushError>;
}

/// Transport used when push messaging is not available in the current
/// environment; every operation reports [`PushError::Unsupported`].
pub struct UnsupportedTransport;

#[async_trait]
impl PushTransport for UnsupportedTransport {
    async fn permission(&self) -> Result<PermissionState, PushError> {
        Err(PushError::Unsupported)
    }

    async fn request_permission(&self) -> Result<PermissionState, PushError> {
        Err(PushError::Unsupported)
    }

    async fn fetch_token(&self, _credentials: &AppCredentials) -> Result<String, PushError> {
        Err(PushError::Unsupported)
    }

    async fn subscribe_topic(&self, _token: &str, _topic: &str) -> Result<(), PushError> {
        Err(PushError::Unsupported)
    }

    async fn foreground_stream(&self, _token: &str) -> Result<ForegroundStream, PushError> {
        Err(PushError::Unsupported)
    }
}
