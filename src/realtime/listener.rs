//! Postgres change feed listener
//!
//! Consumes the notification channel fed by the table triggers and forwards
//! every payload to the [`RealtimeHub`].

use std::time::Duration;
use sqlx::postgres::PgListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use crate::database::DatabasePool;
use crate::utils::errors::Result;
use super::hub::{HubStatus, RealtimeHub};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Spawn the listener task
///
/// The task runs until aborted. While the database connection is down the hub
/// reports [`HubStatus::Disconnected`]; subscribers keep their receivers and
/// simply see no changes.
pub fn spawn_listener(pool: DatabasePool, hub: RealtimeHub, channel: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match listen(&pool, &hub, &channel).await {
                Ok(()) => {
                    warn!(channel = %channel, "Change feed listener stopped, reconnecting");
                }
                Err(e) => {
                    error!(channel = %channel, error = %e, "Change feed listener failed");
                }
            }

            hub.set_status(HubStatus::Disconnected);
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

async fn listen(pool: &DatabasePool, hub: &RealtimeHub, channel: &str) -> Result<()> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(channel).await?;

    info!(channel = %channel, "Listening for table changes");
    hub.set_status(HubStatus::Connected);

    loop {
        // `None` means the connection dropped
        match listener.try_recv().await? {
            Some(notification) => {
                if let Err(e) = hub.publish_payload(notification.payload()) {
                    warn!(error = %e, "Skipping undecodable change notification");
                }
            }
            None => return Ok(()),
        }
    }
}
