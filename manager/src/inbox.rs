//! Mirror of the message collection for the dashboard.
//!
//! Replaced wholesale on every feed snapshot. A feed error flags the
//! mirror without discarding the cached documents.

use std::sync::Arc;

use chrono::{Duration, Utc};
use feed_client::{MessageDoc, MessageStatus};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};

use crate::events;

/// Aggregate counts shown on the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxStats {
    pub total: usize,
    pub unread: usize,
    pub read: usize,
    pub this_week: usize,
}

struct InboxInner {
    messages: Vec<MessageDoc>,
    loading: bool,
    error: Option<String>,
    ws_tx: broadcast::Sender<String>,
}

#[derive(Clone)]
pub struct Inbox {
    inner: Arc<RwLock<InboxInner>>,
}

impl Inbox {
    pub fn new(ws_tx: broadcast::Sender<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(InboxInner {
                messages: Vec::new(),
                loading: true,
                error: None,
                ws_tx,
            })),
        }
    }

    /// Replace the mirror with the feed's current ordered document set.
    pub async fn apply_snapshot(&self, documents: Vec<MessageDoc>) {
        let mut inner = self.inner.write().await;
        inner.messages = documents;
        inner.loading = false;
        inner.error = None;

        let payload = events::MessagesUpdatedPayload {
            total: inner.messages.len(),
            unread: count_unread(&inner.messages),
        };
        let _ = inner
            .ws_tx
            .send(events::envelope(events::MESSAGES_UPDATED, payload));
    }

    /// Flag a feed error. The cached documents stay as they were.
    pub async fn set_error(&self, message: String) {
        let mut inner = self.inner.write().await;
        inner.loading = false;
        inner.error = Some(message.clone());

        let payload = events::ErrorPayload { message };
        let _ = inner
            .ws_tx
            .send(events::envelope(events::FEED_ERROR, payload));
    }

    /// Current mirror state: documents, loading flag, error flag.
    pub async fn snapshot(&self) -> (Vec<MessageDoc>, bool, Option<String>) {
        let inner = self.inner.read().await;
        (inner.messages.clone(), inner.loading, inner.error.clone())
    }

    pub async fn stats(&self) -> InboxStats {
        let inner = self.inner.read().await;
        let week_ago = Utc::now() - Duration::days(7);
        let unread = count_unread(&inner.messages);
        InboxStats {
            total: inner.messages.len(),
            unread,
            read: inner.messages.len() - unread,
            this_week: inner
                .messages
                .iter()
                .filter(|m| m.timestamp > week_ago)
                .count(),
        }
    }
}

fn count_unread(messages: &[MessageDoc]) -> usize {
    messages
        .iter()
        .filter(|m| m.status == MessageStatus::Unread)
        .count()
}
