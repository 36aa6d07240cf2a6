//! Push permission and registration token lifecycle.
//!
//! Sole owner of the permission mirror and the cached registration
//! token. Transport failures never propagate to callers; every path
//! degrades to a null result with a logged diagnostic.

use std::sync::Arc;

use chrono::Utc;
use manager_db::Database;
use manager_db::tokens::PushToken;
use push_client::{
    AppCredentials, ForegroundStream, PermissionState, PushError, PushTransport,
};
use tokio::sync::{RwLock, broadcast};

use crate::events;

pub struct PushManager {
    transport: Arc<dyn PushTransport>,
    db: Database,
    ws_tx: broadcast::Sender<String>,
    credentials: AppCredentials,
    topic: String,
    permission: RwLock<PermissionState>,
    token: RwLock<Option<String>>,
}

impl PushManager {
    /// Create the manager, restoring a previously cached token.
    pub fn new(
        transport: Arc<dyn PushTransport>,
        db: Database,
        ws_tx: broadcast::Sender<String>,
        credentials: AppCredentials,
        topic: String,
    ) -> Self {
        let token = match db.get_latest_push_token() {
            Ok(stored) => stored.map(|t| t.token),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load cached push token");
                None
            }
        };

        Self {
            transport,
            db,
            ws_tx,
            credentials,
            topic,
            permission: RwLock::new(PermissionState::Default),
            token: RwLock::new(token),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Last mirrored permission value, without a transport round-trip.
    pub async fn permission(&self) -> PermissionState {
        *self.permission.read().await
    }

    /// Read the live platform permission value and refresh the mirror.
    ///
    /// The platform state can change outside this process (device
    /// settings), so callers re-read instead of caching indefinitely.
    pub async fn current_permission(&self) -> PermissionState {
        match self.transport.permission().await {
            Ok(p) => {
                self.set_permission(p).await;
                p
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read live permission state");
                *self.permission.read().await
            }
        }
    }

    /// Last cached registration token, if any.
    pub async fn stored_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Request notification permission and, if granted, obtain and
    /// cache a registration token.
    ///
    /// `denied` is sticky: no prompt and no token fetch happen once the
    /// user has declined. Returns `None` on denial and on any transport
    /// failure.
    pub async fn request_permission(&self) -> Option<String> {
        if self.current_permission().await == PermissionState::Denied {
            tracing::info!("Notification permission denied; not prompting");
            return None;
        }

        let state = match self.transport.request_permission().await {
            Ok(s) => s,
            Err(PushError::Unsupported) => {
                tracing::warn!("Push messaging not supported; cannot request permission");
                return None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Permission request failed");
                return None;
            }
        };
        self.set_permission(state).await;

        if state != PermissionState::Granted {
            tracing::info!(state = state.as_str(), "Notification permission not granted");
            return None;
        }

        let token = match self.transport.fetch_token(&self.credentials).await {
            Ok(t) => t,
            Err(PushError::Unsupported) => {
                tracing::warn!("Push messaging not supported; no registration token");
                return None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Registration token fetch failed");
                return None;
            }
        };

        self.cache_token(&token).await;

        if self.ensure_subscribed(&self.topic).await {
            tracing::info!(topic = %self.topic, "Subscribed to push topic");
        }

        Some(token)
    }

    /// Re-affirm the token/topic association. Idempotent; true when the
    /// association currently holds.
    pub async fn ensure_subscribed(&self, topic: &str) -> bool {
        let Some(token) = self.stored_token().await else {
            return false;
        };
        if self.permission().await != PermissionState::Granted {
            return false;
        }
        match self.transport.subscribe_topic(&token, topic).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, topic, "Topic subscription failed");
                false
            }
        }
    }

    /// Startup path: with a stored token and granted permission,
    /// re-affirm the topic subscription.
    pub async fn bootstrap(&self) {
        if self.current_permission().await != PermissionState::Granted {
            return;
        }
        if self.stored_token().await.is_none() {
            return;
        }
        if self.ensure_subscribed(&self.topic).await {
            tracing::info!("Using stored registration token for push delivery");
        }
    }

    /// Open the foreground message stream with the stored token.
    pub async fn open_foreground(&self) -> Result<Option<ForegroundStream>, PushError> {
        let Some(token) = self.stored_token().await else {
            return Ok(None);
        };
        Ok(Some(self.transport.foreground_stream(&token).await?))
    }

    async fn set_permission(&self, state: PermissionState) {
        let mut guard = self.permission.write().await;
        if *guard != state {
            *guard = state;
            let payload = events::PermissionPayload {
                permission: state.as_str(),
            };
            let _ = self
                .ws_tx
                .send(events::envelope(events::PERMISSION_CHANGED, payload));
        }
    }

    async fn cache_token(&self, token: &str) {
        *self.token.write().await = Some(token.to_string());
        let record = PushToken {
            token: token.to_string(),
            topic: Some(self.topic.clone()),
            issued_at: Utc::now().timestamp(),
        };
        if let Err(e) = self.db.save_push_token(&record) {
            tracing::warn!(error = %e, "Failed to persist push token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::StubTransport;

    fn manager(transport: Arc<StubTransport>) -> PushManager {
        let (ws_tx, _) = broadcast::channel(16);
        PushManager::new(
            transport,
            Database::open_in_memory().unwrap(),
            ws_tx,
            AppCredentials {
                api_key: "key".into(),
                sender_id: "sender".into(),
                app_id: "app".into(),
                vapid_key: "vapid".into(),
            },
            "messages".into(),
        )
    }

    #[tokio::test]
    async fn denied_permission_skips_prompt_and_token_fetch() {
        let transport = Arc::new(StubTransport::with_permission(PermissionState::Denied));
        let mgr = manager(transport.clone());

        assert!(mgr.request_permission().await.is_none());
        assert_eq!(transport.prompt_calls(), 0);
        assert_eq!(transport.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn granted_permission_fetches_and_caches_token() {
        let transport = Arc::new(StubTransport::granting("tok-1"));
        let mgr = manager(transport.clone());

        let token = mgr.request_permission().await;
        assert_eq!(token.as_deref(), Some("tok-1"));
        assert_eq!(transport.fetch_calls(), 1);
        assert_eq!(mgr.stored_token().await.as_deref(), Some("tok-1"));
        assert_eq!(mgr.permission().await, PermissionState::Granted);

        // Token persisted for the next session
        let stored = mgr.db.get_latest_push_token().unwrap().unwrap();
        assert_eq!(stored.token, "tok-1");
    }

    #[tokio::test]
    async fn prompt_dismissed_returns_none_without_fetch() {
        let transport = Arc::new(StubTransport::with_permission(PermissionState::Default));
        let mgr = manager(transport.clone());

        assert!(mgr.request_permission().await.is_none());
        assert_eq!(transport.prompt_calls(), 1);
        assert_eq!(transport.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn token_fetch_failure_maps_to_none() {
        let transport = Arc::new(StubTransport::granting_with_fetch_error());
        let mgr = manager(transport.clone());

        assert!(mgr.request_permission().await.is_none());
        assert_eq!(transport.fetch_calls(), 1);
        assert!(mgr.stored_token().await.is_none());
    }

    #[tokio::test]
    async fn ensure_subscribed_requires_token_and_grant() {
        let transport = Arc::new(StubTransport::granting("tok-1"));
        let mgr = manager(transport.clone());

        // No token yet
        assert!(!mgr.ensure_subscribed("messages").await);

        mgr.request_permission().await;
        assert!(mgr.ensure_subscribed("messages").await);
        // Repeated association is not an error
        assert!(mgr.ensure_subscribed("messages").await);
    }
}
