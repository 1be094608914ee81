//! Server-sent change stream for the admin panel
//!
//! Browsers subscribe per table and patch their lists from `insert`,
//! `update` and `delete` events. A `resync` event means the stream fell
//! behind, or a row was too large to send, and the list should be fetched
//! again.

use std::convert::Infallible;
use std::time::Duration;
use axum::extract::{Path, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::Stream;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, warn};
use uuid::Uuid;
use crate::models::Table;
use crate::realtime::RawChange;
use crate::state::AppContext;
use crate::utils::errors::Result;

#[derive(Debug, Serialize)]
struct ChangePayload {
    id: Option<Uuid>,
    record: Option<Value>,
}

fn change_event(change: RawChange) -> Option<SseEvent> {
    let name = change.event_type.as_str().to_lowercase();
    let payload = ChangePayload {
        id: change.record_id(),
        record: change.new,
    };

    match SseEvent::default().event(name.as_str()).json_data(&payload) {
        Ok(event) => Some(event),
        Err(err) => {
            error!(table = %change.table, error = %err, "Failed to serialize change event");
            None
        }
    }
}

pub async fn stream_changes(
    State(ctx): State<AppContext>,
    Path(table): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<SseEvent, Infallible>>>> {
    let table: Table = table.parse()?;
    let mut receiver = ctx.hub.subscribe(table);
    let status = ctx.hub.status();
    debug!(table = %table, "Change stream opened");

    let stream = async_stream::stream! {
        if let Ok(event) = SseEvent::default().event("status").json_data(status) {
            yield Ok(event);
        }

        loop {
            match receiver.recv().await {
                Ok(change) if change.is_partial() => {
                    let id = change.record_id().map(|id| id.to_string()).unwrap_or_default();
                    yield Ok(SseEvent::default().event("resync").data(id));
                }
                Ok(change) => {
                    if let Some(event) = change_event(change) {
                        yield Ok(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(table = %table, skipped = skipped, "Change stream lagged");
                    yield Ok(SseEvent::default().event("resync").data(skipped.to_string()));
                }
                Err(RecvError::Closed) => break,
            }
        }

        debug!(table = %table, "Change stream closed");
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
