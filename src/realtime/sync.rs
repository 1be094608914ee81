//! Realtime sync hook
//!
//! A component mounts one subscription per table for as long as it is alive.
//! Every change delivered to the subscription is decoded for the component's
//! record type, handed to the matching callback and then, optionally,
//! announced with a toast.

use serde::Serialize;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::models::{Record, Table};
use crate::state::notifications::NotificationStore;
use super::change::{Change, RawChange};
use super::hub::{HubStatus, RealtimeHub};

type RecordCallback<T> = Box<dyn Fn(T) + Send + Sync>;
type DeleteCallback = Box<dyn Fn(Uuid) + Send + Sync>;
type ResyncCallback = Box<dyn Fn() + Send + Sync>;

/// Optional reactions to remote changes
pub struct SyncCallbacks<T> {
    on_insert: Option<RecordCallback<T>>,
    on_update: Option<RecordCallback<T>>,
    on_delete: Option<DeleteCallback>,
    on_resync: Option<ResyncCallback>,
}

impl<T> Default for SyncCallbacks<T> {
    fn default() -> Self {
        Self {
            on_insert: None,
            on_update: None,
            on_delete: None,
            on_resync: None,
        }
    }
}

impl<T> SyncCallbacks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_insert(mut self, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
        self.on_insert = Some(Box::new(callback));
        self
    }

    pub fn on_update(mut self, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    pub fn on_delete(mut self, callback: impl Fn(Uuid) + Send + Sync + 'static) -> Self {
        self.on_delete = Some(Box::new(callback));
        self
    }

    /// Called when the subscriber fell behind and missed changes, or when a
    /// change arrived without the row it describes
    pub fn on_resync(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_resync = Some(Box::new(callback));
        self
    }

    fn dispatch(&self, change: Change<T>) {
        match change {
            Change::Inserted(record) => {
                if let Some(callback) = &self.on_insert {
                    callback(record);
                }
            }
            Change::Updated(record) => {
                if let Some(callback) = &self.on_update {
                    callback(record);
                }
            }
            Change::Deleted(id) => {
                if let Some(callback) = &self.on_delete {
                    callback(id);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub enabled: bool,
    pub show_notifications: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            show_notifications: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Disconnected,
    Connected,
    Closed,
}

impl From<HubStatus> for SyncStatus {
    fn from(status: HubStatus) -> Self {
        match status {
            HubStatus::Connected => SyncStatus::Connected,
            HubStatus::Disconnected => SyncStatus::Disconnected,
        }
    }
}

/// A live subscription owned by one component
///
/// Dropping the handle aborts the subscription task; [`SyncHandle::unmount`]
/// additionally waits until the task has stopped.
pub struct SyncHandle {
    table: Table,
    status: watch::Receiver<SyncStatus>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Subscribe to changes of `T`'s table
    ///
    /// With `enabled: false` no subscription is opened and the handle stays
    /// [`SyncStatus::Disconnected`].
    pub fn mount<T: Record>(
        hub: &RealtimeHub,
        notifications: Option<NotificationStore>,
        callbacks: SyncCallbacks<T>,
        options: SyncOptions,
    ) -> Self {
        let table = T::TABLE;

        if !options.enabled {
            let (_sender, status) = watch::channel(SyncStatus::Disconnected);
            return Self {
                table,
                status,
                shutdown: None,
                task: None,
            };
        }

        let receiver = hub.subscribe(table);
        let hub_status = hub.watch_status();
        let (status_tx, status) = watch::channel(SyncStatus::from(hub.status()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let notifications = if options.show_notifications { notifications } else { None };

        debug!(table = %table, "Mounting realtime subscription");

        let task = tokio::spawn(run_subscription(
            receiver,
            hub_status,
            status_tx,
            shutdown_rx,
            callbacks,
            notifications,
        ));

        Self {
            table,
            status,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Close the subscription and wait for it to stop
    ///
    /// Once this returns no callback of this handle runs again.
    pub async fn unmount(mut self) {
        self.close().await;
    }

    async fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(table = %self.table, error = %e, "Realtime subscription task failed");
                }
            }
        }
        debug!(table = %self.table, "Realtime subscription closed");
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for SyncHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncHandle")
            .field("table", &self.table)
            .field("status", &*self.status.borrow())
            .finish()
    }
}

async fn run_subscription<T: Record>(
    mut receiver: broadcast::Receiver<RawChange>,
    mut hub_status: watch::Receiver<HubStatus>,
    status: watch::Sender<SyncStatus>,
    mut shutdown: oneshot::Receiver<()>,
    callbacks: SyncCallbacks<T>,
    notifications: Option<NotificationStore>,
) {
    let table = T::TABLE;
    let mut hub_open = true;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            changed = hub_status.changed(), if hub_open => {
                match changed {
                    Ok(()) => {
                        let current = SyncStatus::from(*hub_status.borrow_and_update());
                        let _ = status.send(current);
                    }
                    Err(_) => hub_open = false,
                }
            }

            received = receiver.recv() => {
                match received {
                    Ok(raw) if raw.is_partial() => {
                        debug!(table = %table, id = ?raw.record_id(), "Change arrived without a row image, requesting resync");
                        if let Some(callback) = &callbacks.on_resync {
                            callback();
                        }
                    }
                    Ok(raw) => handle_change(&raw, &callbacks, notifications.as_ref()),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(table = %table, missed = missed, "Realtime subscriber lagged, requesting resync");
                        if let Some(callback) = &callbacks.on_resync {
                            callback();
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!(table = %table, "Change feed closed");
                        break;
                    }
                }
            }
        }
    }

    let _ = status.send(SyncStatus::Closed);
}

fn handle_change<T: Record>(
    raw: &RawChange,
    callbacks: &SyncCallbacks<T>,
    notifications: Option<&NotificationStore>,
) {
    let change = match raw.decode::<T>() {
        Ok(change) => change,
        Err(e) => {
            warn!(table = %raw.table, event_type = raw.event_type.as_str(), error = %e, "Skipping undecodable change");
            return;
        }
    };

    let toast = notifications.map(|_| describe(&change));
    callbacks.dispatch(change);

    if let (Some(store), Some((title, message))) = (notifications, toast) {
        store.info(title, message);
    }
}

fn describe<T: Record>(change: &Change<T>) -> (String, String) {
    match change {
        Change::Inserted(record) => (format!("{} added", T::ENTITY), record.label()),
        Change::Updated(record) => (format!("{} updated", T::ENTITY), record.label()),
        Change::Deleted(_) => (
            format!("{} removed", T::ENTITY),
            format!("A {} was deleted", T::ENTITY.to_lowercase()),
        ),
    }
}

/// Owner of at most one mounted subscription
///
/// Mounting again tears down the previous subscription first, so a component
/// never holds two.
#[derive(Debug, Default)]
pub struct SyncHook {
    handle: Option<SyncHandle>,
}

impl SyncHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mount<T: Record>(
        &mut self,
        hub: &RealtimeHub,
        notifications: Option<NotificationStore>,
        callbacks: SyncCallbacks<T>,
        options: SyncOptions,
    ) {
        self.unmount().await;
        self.handle = Some(SyncHandle::mount(hub, notifications, callbacks, options));
    }

    pub async fn unmount(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.unmount().await;
        }
    }

    pub fn table(&self) -> Option<Table> {
        self.handle.as_ref().map(SyncHandle::table)
    }

    pub fn status(&self) -> SyncStatus {
        self.handle
            .as_ref()
            .map(SyncHandle::status)
            .unwrap_or(SyncStatus::Closed)
    }

    pub fn is_mounted(&self) -> bool {
        self.handle.is_some()
    }
}
