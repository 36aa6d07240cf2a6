//! Event notifier: dispatches incoming feed and push events.
//!
//! Both sources converge on one channel and a single consumer task, so
//! handling is serialized: each event is fully applied before the next
//! is dispatched.

use std::time::Duration;

use feed_client::{ChangeType, FeedClient, FeedConfig, FeedEvent, MessageStatus};
use push_client::PushPayload;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::app::SharedState;
use crate::notification::{self, NewNotification};

const SOURCE_CAPACITY: usize = 256;
const NEW_MESSAGE_TITLE: &str = "New Message Received";
const PUSH_FALLBACK_TITLE: &str = "New Message";
const PUSH_FALLBACK_BODY: &str = "You have a new message";

/// An event from either source, in arrival order per source.
#[derive(Debug)]
pub enum SourceEvent {
    Feed(FeedEvent),
    Push(PushPayload),
}

/// Create the source channel feeding the notifier.
pub fn source_channel() -> (mpsc::Sender<SourceEvent>, mpsc::Receiver<SourceEvent>) {
    mpsc::channel(SOURCE_CAPACITY)
}

/// Consume source events until every sender is gone.
pub async fn run(state: SharedState, mut events: mpsc::Receiver<SourceEvent>) {
    // The first snapshot of a subscription is bulk pre-existing state,
    // not news; it must not produce a notification flood.
    let mut initial_pending = true;

    while let Some(event) = events.recv().await {
        handle_event(&state, &mut initial_pending, event).await;
    }

    tracing::info!("Notifier stopped");
}

async fn handle_event(state: &SharedState, initial_pending: &mut bool, event: SourceEvent) {
    match event {
        SourceEvent::Feed(FeedEvent::Subscribed) => {
            // A (re)subscription starts a fresh snapshot sequence.
            *initial_pending = true;
        }
        SourceEvent::Feed(FeedEvent::Snapshot(update)) => {
            let announce = !*initial_pending;
            *initial_pending = false;

            if announce {
                for change in &update.changes {
                    if change.kind != ChangeType::Added {
                        continue;
                    }
                    if change.doc.status != MessageStatus::Unread {
                        continue;
                    }
                    let body = format!("From {}: {}", change.doc.name, change.doc.subject);
                    notification::publish(state, NewNotification::message(NEW_MESSAGE_TITLE, body))
                        .await;
                }
            }

            state.inbox().apply_snapshot(update.documents).await;
        }
        SourceEvent::Feed(FeedEvent::Error(message)) => {
            tracing::warn!(message = %message, "Feed error");
            state.inbox().set_error(message).await;
        }
        SourceEvent::Push(payload) => {
            let content = payload.notification.unwrap_or_default();
            let title = content
                .title
                .unwrap_or_else(|| PUSH_FALLBACK_TITLE.to_string());
            let body = content
                .body
                .unwrap_or_else(|| PUSH_FALLBACK_BODY.to_string());
            notification::publish(state, NewNotification::message(title, body)).await;
        }
    }
}

/// Forward feed events into the source channel.
///
/// The feed client reconnects on its own; this pump just bridges its
/// receiver and registers the stop signal for shutdown.
pub async fn run_feed_pump(state: SharedState, tx: mpsc::Sender<SourceEvent>) {
    let config = state.config().await;
    let feed_config = FeedConfig {
        url: config.feed_ws_url.clone(),
        collection: config.feed_collection.clone(),
    };
    drop(config);

    if feed_config.url.is_empty() {
        tracing::warn!("FEED_WS_URL not configured; feed disabled");
        return;
    }

    let (mut events, shutdown) = FeedClient::connect(feed_config);
    state.set_feed_shutdown(shutdown).await;

    while let Some(event) = events.recv().await {
        if tx.send(SourceEvent::Feed(event)).await.is_err() {
            return;
        }
    }
    tracing::warn!("Feed event stream ended");
}

/// Forward foreground push payloads into the source channel.
///
/// Waits until a registration token exists, then keeps the foreground
/// stream open, reconnecting when it drops.
pub async fn run_push_pump(state: SharedState, tx: mpsc::Sender<SourceEvent>) {
    state.push().bootstrap().await;

    loop {
        if state.shutdown_token().is_cancelled() {
            return;
        }

        if state.push().stored_token().await.is_none() {
            tokio::select! {
                _ = state.shutdown_token().cancelled() => return,
                _ = sleep(Duration::from_secs(30)) => continue,
            }
        }

        match state.push().open_foreground().await {
            Ok(Some(mut stream)) => {
                loop {
                    tokio::select! {
                        _ = state.shutdown_token().cancelled() => {
                            let _ = stream.shutdown.send(()).await;
                            return;
                        }
                        payload = stream.payloads.recv() => {
                            let Some(payload) = payload else { break };
                            if tx.send(SourceEvent::Push(payload)).await.is_err() {
                                return;
                            }
                        }
                    }
                }
                tracing::warn!("Foreground stream ended, will reconnect");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Foreground stream connection failed");
            }
        }

        tokio::select! {
            _ = state.shutdown_token().cancelled() => return,
            _ = sleep(Duration::from_secs(5)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use feed_client::{DocChange, FeedUpdate, MessageDoc};
    use push_client::{NotificationContent, PermissionState};

    use super::*;
    use crate::app::test_support::StubTransport;

    fn doc(id: &str, name: &str, subject: &str, status: MessageStatus) -> MessageDoc {
        MessageDoc {
            id: id.into(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            subject: subject.into(),
            message: "Hi".into(),
            company: None,
            phone: None,
            timestamp: Utc::now(),
            status,
        }
    }

    fn added(d: MessageDoc) -> DocChange {
        DocChange {
            kind: ChangeType::Added,
            doc: d,
        }
    }

    fn state() -> SharedState {
        SharedState::for_tests(Arc::new(StubTransport::with_permission(
            PermissionState::Default,
        )))
    }

    async fn feed(state: &SharedState, pending: &mut bool, event: FeedEvent) {
        handle_event(state, pending, SourceEvent::Feed(event)).await;
    }

    #[tokio::test]
    async fn initial_snapshot_produces_no_notifications() {
        let s = state();
        let mut pending = true;

        let docs = vec![
            doc("m1", "Alice", "One", MessageStatus::Unread),
            doc("m2", "Bob", "Two", MessageStatus::Unread),
            doc("m3", "Carol", "Three", MessageStatus::Unread),
        ];
        let changes = docs.clone().into_iter().map(added).collect();
        feed(
            &s,
            &mut pending,
            FeedEvent::Snapshot(FeedUpdate {
                documents: docs,
                changes,
            }),
        )
        .await;

        assert_eq!(s.notifications().unread_count().await, 0);
        let (entries, _) = s.notifications().snapshot().await;
        assert!(entries.is_empty());
        // The mirror is populated regardless
        let (messages, loading, _) = s.inbox().snapshot().await;
        assert_eq!(messages.len(), 3);
        assert!(!loading);
    }

    #[tokio::test]
    async fn later_added_unread_document_produces_one_notification() {
        let s = state();
        let mut pending = true;

        feed(
            &s,
            &mut pending,
            FeedEvent::Snapshot(FeedUpdate {
                documents: vec![doc("m1", "Bob", "Old", MessageStatus::Unread)],
                changes: vec![],
            }),
        )
        .await;

        let new_doc = doc("m2", "Alice", "Hello", MessageStatus::Unread);
        feed(
            &s,
            &mut pending,
            FeedEvent::Snapshot(FeedUpdate {
                documents: vec![new_doc.clone(), doc("m1", "Bob", "Old", MessageStatus::Unread)],
                changes: vec![added(new_doc)],
            }),
        )
        .await;

        let (entries, unread) = s.notifications().snapshot().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(unread, 1);
        assert_eq!(entries[0].title, "New Message Received");
        assert!(entries[0].body.contains("Alice"));
        assert!(entries[0].body.contains("Hello"));
    }

    #[tokio::test]
    async fn added_read_document_produces_no_notification() {
        let s = state();
        let mut pending = false;

        let new_doc = doc("m1", "Alice", "Hello", MessageStatus::Read);
        feed(
            &s,
            &mut pending,
            FeedEvent::Snapshot(FeedUpdate {
                documents: vec![new_doc.clone()],
                changes: vec![added(new_doc)],
            }),
        )
        .await;

        assert_eq!(s.notifications().unread_count().await, 0);
    }

    #[tokio::test]
    async fn modified_change_produces_no_notification() {
        let s = state();
        let mut pending = false;

        let d = doc("m1", "Alice", "Hello", MessageStatus::Unread);
        feed(
            &s,
            &mut pending,
            FeedEvent::Snapshot(FeedUpdate {
                documents: vec![d.clone()],
                changes: vec![DocChange {
                    kind: ChangeType::Modified,
                    doc: d,
                }],
            }),
        )
        .await;

        assert_eq!(s.notifications().unread_count().await, 0);
    }

    #[tokio::test]
    async fn resubscription_rearms_initial_suppression() {
        let s = state();
        let mut pending = false;

        feed(&s, &mut pending, FeedEvent::Subscribed).await;
        assert!(pending);

        let d = doc("m1", "Alice", "Hello", MessageStatus::Unread);
        feed(
            &s,
            &mut pending,
            FeedEvent::Snapshot(FeedUpdate {
                documents: vec![d.clone()],
                changes: vec![added(d)],
            }),
        )
        .await;

        assert_eq!(s.notifications().unread_count().await, 0);
    }

    #[tokio::test]
    async fn push_payload_produces_notification_with_given_fields() {
        let s = state();
        let mut pending = true;

        let payload = PushPayload {
            notification: Some(NotificationContent {
                title: Some("Ping".into()),
                body: Some("Test".into()),
            }),
            data: Default::default(),
        };
        handle_event(&s, &mut pending, SourceEvent::Push(payload)).await;

        let (entries, unread) = s.notifications().snapshot().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(unread, 1);
        assert_eq!(entries[0].title, "Ping");
        assert_eq!(entries[0].body, "Test");
        assert!(!entries[0].read);
    }

    #[tokio::test]
    async fn push_payload_without_fields_uses_defaults() {
        let s = state();
        let mut pending = true;

        handle_event(&s, &mut pending, SourceEvent::Push(PushPayload::default())).await;

        let (entries, _) = s.notifications().snapshot().await;
        assert_eq!(entries[0].title, "New Message");
        assert_eq!(entries[0].body, "You have a new message");
    }

    #[tokio::test]
    async fn feed_and_push_paths_are_not_deduplicated() {
        let s = state();
        let mut pending = false;

        let d = doc("m1", "Alice", "Hello", MessageStatus::Unread);
        feed(
            &s,
            &mut pending,
            FeedEvent::Snapshot(FeedUpdate {
                documents: vec![d.clone()],
                changes: vec![added(d)],
            }),
        )
        .await;
        handle_event(
            &s,
            &mut pending,
            SourceEvent::Push(PushPayload {
                notification: Some(NotificationContent {
                    title: Some("New Message Received".into()),
                    body: Some("From Alice: Hello".into()),
                }),
                data: Default::default(),
            }),
        )
        .await;

        let (entries, unread) = s.notifications().snapshot().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(unread, 2);
    }

    #[tokio::test]
    async fn feed_error_flags_inbox_without_clearing_it() {
        let s = state();
        let mut pending = true;

        feed(
            &s,
            &mut pending,
            FeedEvent::Snapshot(FeedUpdate {
                documents: vec![doc("m1", "Alice", "Hello", MessageStatus::Unread)],
                changes: vec![],
            }),
        )
        .await;
        feed(&s, &mut pending, FeedEvent::Error("connectivity lost".into())).await;

        let (messages, _, error) = s.inbox().snapshot().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(error.as_deref(), Some("connectivity lost"));
        // Notification state is untouched by feed errors
        assert_eq!(s.notifications().unread_count().await, 0);
    }
}
