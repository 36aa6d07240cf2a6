use std::path::PathBuf;
use std::sync::Arc;

use manager_db::Database;
use push_client::PushTransport;
use tokio::sync::{Mutex, RwLock, broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::inbox::Inbox;
use crate::notification::NotificationCenter;
use crate::push::PushManager;

/// Application shared state accessible from the axum handlers and the
/// background tasks.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for WebSocket messages
    ws_tx: broadcast::Sender<String>,
    /// Application configuration
    config: RwLock<AppConfig>,
    /// Database handle
    db: Database,
    /// Data directory path
    data_dir: PathBuf,
    /// Notification list owner
    notifications: NotificationCenter,
    /// Message collection mirror
    inbox: Inbox,
    /// Permission/token lifecycle owner
    push: PushManager,
    /// Cancels all background loops
    shutdown_token: CancellationToken,
    /// Stop signal for the feed subscription, once connected
    feed_shutdown: Mutex<Option<mpsc::Sender<()>>>,
}

impl SharedState {
    /// Create shared state from an already-opened database and loaded config.
    pub fn new(
        db: Database,
        config: AppConfig,
        data_dir: PathBuf,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        let (ws_tx, _) = broadcast::channel(2048);

        let push = PushManager::new(
            transport,
            db.clone(),
            ws_tx.clone(),
            config.credentials(),
            config.push_topic.clone(),
        );

        Self {
            inner: Arc::new(SharedStateInner {
                notifications: NotificationCenter::new(ws_tx.clone()),
                inbox: Inbox::new(ws_tx.clone()),
                push,
                ws_tx,
                config: RwLock::new(config),
                db,
                data_dir,
                shutdown_token: CancellationToken::new(),
                feed_shutdown: Mutex::new(None),
            }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner
            .config
            .try_read()
            .map(|c| c.server_port)
            .unwrap_or(8080)
    }

    pub fn ws_sender(&self) -> &broadcast::Sender<String> {
        &self.inner.ws_tx
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<String> {
        self.inner.ws_tx.subscribe()
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.inner.data_dir
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.inner.notifications
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inner.inbox
    }

    pub fn push(&self) -> &PushManager {
        &self.inner.push
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    /// Reload config from the database.
    pub async fn reload_config(&self) -> Result<(), anyhow::Error> {
        let sm = crate::config::SettingsManager::new(self.inner.db.clone());
        let mut config = self.inner.config.write().await;
        *config = AppConfig::load(&sm)?;
        Ok(())
    }

    pub async fn set_feed_shutdown(&self, tx: mpsc::Sender<()>) {
        let mut slot = self.inner.feed_shutdown.lock().await;
        *slot = Some(tx);
    }

    pub async fn take_feed_shutdown(&self) -> Option<mpsc::Sender<()>> {
        self.inner.feed_shutdown.lock().await.take()
    }
}
