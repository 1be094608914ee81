//! Per-table fan-out of change notifications

use std::collections::HashMap;
use std::sync::Arc;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};
use crate::models::Table;
use crate::utils::errors::Result;
use crate::utils::logging::log_realtime_event;
use super::change::RawChange;

/// Whether the hub currently receives changes from the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HubStatus {
    Disconnected,
    Connected,
}

struct HubInner {
    channels: HashMap<Table, broadcast::Sender<RawChange>>,
    status: watch::Sender<HubStatus>,
}

/// Lightweight broadcast hub with one bounded channel per table
#[derive(Clone)]
pub struct RealtimeHub {
    inner: Arc<HubInner>,
}

impl RealtimeHub {
    pub fn new(buffer_size: usize) -> Self {
        let channels = Table::ALL
            .iter()
            .map(|table| {
                let (sender, _receiver) = broadcast::channel(buffer_size.max(1));
                (*table, sender)
            })
            .collect();
        let (status, _receiver) = watch::channel(HubStatus::Disconnected);

        Self {
            inner: Arc::new(HubInner { channels, status }),
        }
    }

    pub fn subscribe(&self, table: Table) -> broadcast::Receiver<RawChange> {
        self.sender(table).subscribe()
    }

    /// Route a change to its table's subscribers
    ///
    /// Returns the number of subscribers that received it. A change for an
    /// unknown table is dropped.
    pub fn publish(&self, change: RawChange) -> usize {
        let table = match change.table() {
            Ok(table) => table,
            Err(e) => {
                warn!(table = %change.table, error = %e, "Dropping change for unknown table");
                return 0;
            }
        };

        let record_id = change.record_id().map(|id| id.to_string());
        log_realtime_event(table.as_str(), change.event_type.as_str(), record_id.as_deref());

        // No subscribers is not an error
        self.sender(table).send(change).unwrap_or(0)
    }

    /// Parse and route a raw notification payload
    pub fn publish_payload(&self, payload: &str) -> Result<usize> {
        let change = RawChange::from_payload(payload)?;
        Ok(self.publish(change))
    }

    pub fn status(&self) -> HubStatus {
        *self.inner.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<HubStatus> {
        self.inner.status.subscribe()
    }

    pub fn set_status(&self, status: HubStatus) {
        let changed = self.inner.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });

        if changed {
            debug!(status = ?status, "Realtime hub status changed");
        }
    }

    pub fn subscriber_count(&self, table: Table) -> usize {
        self.sender(table).receiver_count()
    }

    fn sender(&self, table: Table) -> &broadcast::Sender<RawChange> {
        // Every table gets a channel in new()
        &self.inner.channels[&table]
    }
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub").field("status", &self.status()).finish()
    }
}
