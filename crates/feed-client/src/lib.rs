//! Document gateway client library.
//!
//! Provides the real-time change feed over the message collection
//! (WebSocket) and the HTTP writer used for document mutations
//! (status updates, deletion).

pub mod listen;
pub mod writer;

pub use listen::{FeedClient, FeedConfig, FeedEvent, FeedUpdate};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact-form message document as stored in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDoc {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Server-assigned recency field; the feed is ordered by it, descending.
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
}

/// Read state of a message document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Read,
    Unread,
}

/// Kind of per-document change reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Removed,
}

/// One per-document change record within a feed emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocChange {
    #[serde(rename = "change")]
    pub kind: ChangeType,
    pub doc: MessageDoc,
}

/// Unified error type for the feed-client crate.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Gateway API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Connection timeout")]
    Timeout,
}
