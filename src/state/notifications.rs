//! Toast notification store
//!
//! An ordered, process-wide queue of short-lived messages. Every toast is
//! removed automatically once its duration elapses; renderers follow the
//! queue through [`NotificationStore::subscribe`].

use std::sync::{Arc, Weak};
use std::time::Duration;
use serde::{Serialize, Serializer};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;
use crate::config::NotificationsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

struct StoreInner {
    toasts: watch::Sender<Vec<Toast>>,
    default_duration: Duration,
    max_queue: usize,
}

/// Handle to the toast queue; clones share the same queue
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<StoreInner>,
}

impl NotificationStore {
    pub fn new(default_duration: Duration, max_queue: usize) -> Self {
        let (toasts, _receiver) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(StoreInner {
                toasts,
                default_duration,
                max_queue: max_queue.max(1),
            }),
        }
    }

    pub fn from_config(config: &NotificationsConfig) -> Self {
        Self::new(Duration::from_millis(config.default_duration_ms), config.max_queue)
    }

    /// Enqueue a toast and schedule its removal
    ///
    /// When the queue is full the oldest toast is dropped. Removal is only
    /// scheduled when called inside a tokio runtime.
    pub fn add(
        &self,
        kind: ToastKind,
        title: impl Into<String>,
        message: Option<String>,
        duration: Option<Duration>,
    ) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            message,
            duration: duration.unwrap_or(self.inner.default_duration),
        };
        let id = toast.id;
        let lifetime = toast.duration;
        let max_queue = self.inner.max_queue;

        debug!(toast_id = %id, kind = ?kind, title = %toast.title, "Adding toast");

        self.inner.toasts.send_modify(|toasts| {
            toasts.push(toast);
            if toasts.len() > max_queue {
                let overflow = toasts.len() - max_queue;
                toasts.drain(..overflow);
            }
        });

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let store: Weak<StoreInner> = Arc::downgrade(&self.inner);
            runtime.spawn(async move {
                tokio::time::sleep(lifetime).await;
                if let Some(inner) = store.upgrade() {
                    NotificationStore { inner }.remove(id);
                }
            });
        }

        id
    }

    /// Remove a toast; unknown ids are ignored
    pub fn remove(&self, id: Uuid) -> bool {
        self.inner.toasts.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|toast| toast.id != id);
            toasts.len() != before
        })
    }

    pub fn clear(&self) {
        self.inner.toasts.send_if_modified(|toasts| {
            let had_any = !toasts.is_empty();
            toasts.clear();
            had_any
        });
    }

    /// Snapshot of the queue, oldest first
    pub fn list(&self) -> Vec<Toast> {
        self.inner.toasts.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.toasts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.toasts.subscribe()
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.add(ToastKind::Success, title, Some(message.into()), None)
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.add(ToastKind::Error, title, Some(message.into()), None)
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.add(ToastKind::Info, title, Some(message.into()), None)
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.add(ToastKind::Warning, title, Some(message.into()), None)
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000), 5)
    }
}

impl std::fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStore").field("len", &self.len()).finish()
    }
}
