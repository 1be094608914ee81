//! Admin dashboard state

use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use crate::database::{ActivityItem, DashboardStats, DatabaseService};
use crate::models::Message;
use crate::realtime::{RealtimeHub, SyncCallbacks, SyncHook, SyncOptions};
use crate::utils::errors::Result;
use super::notifications::NotificationStore;

/// Where the dashboard reads its numbers from
#[async_trait]
pub trait DashboardSource: Send + Sync + 'static {
    async fn stats(&self) -> Result<DashboardStats>;

    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityItem>>;
}

#[async_trait]
impl DashboardSource for DatabaseService {
    async fn stats(&self) -> Result<DashboardStats> {
        self.dashboard_stats().await
    }

    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityItem>> {
        DatabaseService::recent_activity(self, limit).await
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    pub stats: Option<DashboardStats>,
    pub activity: Vec<ActivityItem>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

pub struct Dashboard<S: DashboardSource> {
    source: Arc<S>,
    state: Arc<Mutex<DashboardState>>,
    notifications: NotificationStore,
    activity_limit: usize,
    sync: SyncHook,
}

impl<S: DashboardSource> Dashboard<S> {
    pub fn new(source: S, notifications: NotificationStore, activity_limit: usize) -> Self {
        Self {
            source: Arc::new(source),
            state: Arc::new(Mutex::new(DashboardState::default())),
            notifications,
            activity_limit,
            sync: SyncHook::new(),
        }
    }

    /// Fetch stats and activity concurrently; state changes only when both succeed
    pub async fn refresh(&self) -> Result<()> {
        refresh_state(self.source.as_ref(), &self.state, &self.notifications, self.activity_limit).await
    }

    /// Keep counters current while the dashboard is shown
    ///
    /// Any message change triggers a background refresh so the unread counter
    /// follows the inbox.
    pub async fn mount(&mut self, hub: &RealtimeHub) {
        let source = self.source.clone();
        let state = self.state.clone();
        let notifications = self.notifications.clone();
        let limit = self.activity_limit;

        let trigger = move || {
            let source = source.clone();
            let state = state.clone();
            let notifications = notifications.clone();
            tokio::spawn(async move {
                let _ = refresh_state(source.as_ref(), &state, &notifications, limit).await;
            });
        };
        let on_insert = trigger.clone();
        let on_update = trigger.clone();
        let on_delete = trigger.clone();

        let callbacks = SyncCallbacks::<Message>::new()
            .on_insert(move |_| on_insert())
            .on_update(move |_| on_update())
            .on_delete(move |_| on_delete())
            .on_resync(trigger);

        let options = SyncOptions {
            enabled: true,
            show_notifications: false,
        };
        self.sync.mount::<Message>(hub, None, callbacks, options).await;
    }

    pub async fn unmount(&mut self) {
        self.sync.unmount().await;
    }

    pub fn state(&self) -> DashboardState {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn unread_messages(&self) -> i64 {
        self.state().stats.map(|stats| stats.unread_messages).unwrap_or(0)
    }
}

async fn refresh_state<S: DashboardSource>(
    source: &S,
    state: &Mutex<DashboardState>,
    notifications: &NotificationStore,
    limit: usize,
) -> Result<()> {
    match tokio::try_join!(source.stats(), source.recent_activity(limit)) {
        Ok((stats, activity)) => {
            let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            state.stats = Some(stats);
            state.activity = activity;
            state.refreshed_at = Some(Utc::now());
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Dashboard refresh failed");
            notifications.error("Could not load dashboard", e.to_string());
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::StageLightError;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeSource {
        fail_activity: AtomicBool,
        unread: i64,
    }

    #[async_trait]
    impl DashboardSource for FakeSource {
        async fn stats(&self) -> Result<DashboardStats> {
            Ok(DashboardStats {
                messages: 3,
                unread_messages: self.unread,
                ..DashboardStats::default()
            })
        }

        async fn recent_activity(&self, _limit: usize) -> Result<Vec<ActivityItem>> {
            if self.fail_activity.load(Ordering::SeqCst) {
                return Err(StageLightError::Backend("timeout".to_string()));
            }
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_refresh_updates_state() {
        let source = FakeSource { fail_activity: AtomicBool::new(false), unread: 2 };
        let dashboard = Dashboard::new(source, NotificationStore::default(), 10);

        dashboard.refresh().await.unwrap();

        assert_eq!(dashboard.unread_messages(), 2);
        assert!(dashboard.state().refreshed_at.is_some());
    }

    #[tokio::test]
    async fn test_partial_failure_leaves_state_unchanged() {
        let source = FakeSource { fail_activity: AtomicBool::new(true), unread: 2 };
        let notifications = NotificationStore::default();
        let dashboard = Dashboard::new(source, notifications.clone(), 10);

        assert!(dashboard.refresh().await.is_err());

        assert!(dashboard.state().stats.is_none());
        assert_eq!(notifications.list()[0].title, "Could not load dashboard");
    }
}
