//! In-memory notification list with derived unread count.
//!
//! The list is newest-first by insertion order. The unread count is
//! recomputed under the same write lock as every mutation, so no
//! intermediate state is observable, and it is always exactly the
//! number of entries with `read == false`.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use crate::events;

use super::types::{NewNotification, Notification};

struct CenterInner {
    entries: Vec<Notification>,
    unread: usize,
    ws_tx: broadcast::Sender<String>,
}

impl CenterInner {
    fn recount(&mut self) {
        self.unread = self.entries.iter().filter(|n| !n.read).count();
    }

    fn broadcast_list(&self) {
        let payload = events::NotificationListPayload {
            notifications: self.entries.clone(),
            unread_count: self.unread,
        };
        let _ = self
            .ws_tx
            .send(events::envelope(events::NOTIFICATIONS_UPDATED, payload));
    }
}

/// Owner of all notification state.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<RwLock<CenterInner>>,
}

impl NotificationCenter {
    pub fn new(ws_tx: broadcast::Sender<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CenterInner {
                entries: Vec::new(),
                unread: 0,
                ws_tx,
            })),
        }
    }

    /// Prepend a new entry (the list is newest-first) and return it.
    ///
    /// Entries are never deduplicated: a message arriving through both
    /// the feed and a coincidental foreground push yields two entries.
    pub async fn add(&self, new: NewNotification) -> Notification {
        let entry = Notification::create(new);
        let mut inner = self.inner.write().await;
        inner.entries.insert(0, entry.clone());
        inner.recount();
        let _ = inner
            .ws_tx
            .send(events::envelope(events::NOTIFICATION_ADDED, &entry));
        inner.broadcast_list();
        entry
    }

    /// Mark one entry read. Absent ids are a no-op.
    pub async fn mark_read(&self, id: &str) {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.entries.iter_mut().find(|n| n.id == id) {
            entry.read = true;
        }
        inner.recount();
        inner.broadcast_list();
    }

    /// Mark every entry read.
    pub async fn mark_all_read(&self) {
        let mut inner = self.inner.write().await;
        for entry in &mut inner.entries {
            entry.read = true;
        }
        inner.recount();
        inner.broadcast_list();
    }

    /// Remove one entry. Absent ids are a no-op.
    pub async fn clear(&self, id: &str) {
        let mut inner = self.inner.write().await;
        inner.entries.retain(|n| n.id != id);
        inner.recount();
        inner.broadcast_list();
    }

    /// Remove every entry.
    pub async fn clear_all(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.recount();
        inner.broadcast_list();
    }

    /// Current list and unread count, as one consistent snapshot.
    pub async fn snapshot(&self) -> (Vec<Notification>, usize) {
        let inner = self.inner.read().await;
        (inner.entries.clone(), inner.unread)
    }

    pub async fn unread_count(&self) -> usize {
        self.inner.read().await.unread
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::types::NotificationKind;

    fn center() -> NotificationCenter {
        let (ws_tx, _) = broadcast::channel(64);
        NotificationCenter::new(ws_tx)
    }

    async fn assert_invariant(center: &NotificationCenter) {
        let (entries, unread) = center.snapshot().await;
        assert_eq!(unread, entries.iter().filter(|n| !n.read).count());
    }

    #[tokio::test]
    async fn unread_count_tracks_unread_entries() {
        let c = center();
        c.add(NewNotification::message("a", "1")).await;
        let second = c.add(NewNotification::message("b", "2")).await;
        assert_eq!(c.unread_count().await, 2);
        assert_invariant(&c).await;

        c.mark_read(&second.id).await;
        assert_eq!(c.unread_count().await, 1);
        assert_invariant(&c).await;
    }

    #[tokio::test]
    async fn entries_are_newest_first() {
        let c = center();
        c.add(NewNotification::message("first", "")).await;
        c.add(NewNotification::message("second", "")).await;
        let (entries, _) = c.snapshot().await;
        assert_eq!(entries[0].title, "second");
        assert_eq!(entries[1].title, "first");
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let c = center();
        let a = c.add(NewNotification::message("a", "")).await;
        let b = c.add(NewNotification::message("b", "")).await;
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn mark_read_is_idempotent_once_all_read() {
        let c = center();
        let first = c.add(NewNotification::message("a", "")).await;
        c.add(NewNotification::message("b", "")).await;

        c.mark_all_read().await;
        assert_eq!(c.unread_count().await, 0);

        c.mark_read(&first.id).await;
        assert_eq!(c.unread_count().await, 0);
        assert_invariant(&c).await;
    }

    #[tokio::test]
    async fn mark_read_with_absent_id_is_noop() {
        let c = center();
        c.add(NewNotification::message("a", "")).await;
        c.mark_read("no-such-id").await;
        assert_eq!(c.unread_count().await, 1);
    }

    #[tokio::test]
    async fn clear_with_absent_id_is_noop() {
        let c = center();
        c.add(NewNotification::message("a", "")).await;
        c.clear("no-such-id").await;
        let (entries, unread) = c.snapshot().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(unread, 1);
    }

    #[tokio::test]
    async fn clear_removes_entry_and_recounts() {
        let c = center();
        let a = c.add(NewNotification::message("a", "")).await;
        c.add(NewNotification::message("b", "")).await;
        c.clear(&a.id).await;
        let (entries, unread) = c.snapshot().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(unread, 1);
        assert_invariant(&c).await;
    }

    #[tokio::test]
    async fn clear_all_empties_list_regardless_of_state() {
        let c = center();
        c.add(NewNotification::message("a", "")).await;
        let b = c.add(NewNotification::message("b", "")).await;
        c.mark_read(&b.id).await;

        c.clear_all().await;
        let (entries, unread) = c.snapshot().await;
        assert!(entries.is_empty());
        assert_eq!(unread, 0);
    }

    #[tokio::test]
    async fn add_accepts_system_kind() {
        let c = center();
        let n = c
            .add(NewNotification {
                title: "maintenance".into(),
                body: "scheduled".into(),
                read: false,
                kind: NotificationKind::System,
            })
            .await;
        assert_eq!(n.kind, NotificationKind::System);
    }
}
