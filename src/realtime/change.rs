//! Change feed payloads
//!
//! Triggers installed by the migrations publish one JSON document per row
//! mutation. The document is kept raw while it travels through the hub and is
//! only decoded into a typed [`Change`] at the subscription boundary, where the
//! subscriber knows which record type to expect.
//!
//! Rows too large for a notification arrive without their `new` image. Such
//! a change only names the row; subscribers fetch it again instead of
//! decoding it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use crate::models::{Record, Table};
use crate::utils::errors::{StageLightError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }
}

/// A change notification exactly as published by the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChange {
    pub table: String,
    #[serde(rename = "eventType")]
    pub event_type: ChangeKind,
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub new: Option<Value>,
    #[serde(default)]
    pub old: Option<Value>,
}

/// A decoded row-level change
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    Inserted(T),
    Updated(T),
    Deleted(Uuid),
}

impl<T> Change<T> {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Inserted(_) => ChangeKind::Insert,
            Change::Updated(_) => ChangeKind::Update,
            Change::Deleted(_) => ChangeKind::Delete,
        }
    }
}

impl<T: Record> Change<T> {
    pub fn record_id(&self) -> Uuid {
        match self {
            Change::Inserted(record) | Change::Updated(record) => record.id(),
            Change::Deleted(id) => *id,
        }
    }
}

impl RawChange {
    /// Parse a notification payload
    pub fn from_payload(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn table(&self) -> Result<Table> {
        self.table.parse()
    }

    /// Id of the affected row, taken from whichever image carries it
    pub fn record_id(&self) -> Option<Uuid> {
        let image = match self.event_type {
            ChangeKind::Delete => self.old.as_ref(),
            _ => self.new.as_ref(),
        };

        image
            .and_then(|image| image.get("id"))
            .and_then(Value::as_str)
            .and_then(|id| Uuid::parse_str(id).ok())
            .or(self.id)
    }

    /// An insert or update published without its row image
    pub fn is_partial(&self) -> bool {
        self.event_type != ChangeKind::Delete && self.new.is_none()
    }

    /// Decode into a typed change for `T`
    pub fn decode<T: Record>(&self) -> Result<Change<T>> {
        if self.table != T::TABLE.as_str() {
            return Err(StageLightError::Realtime(format!(
                "Change for table '{}' delivered to a '{}' subscriber",
                self.table,
                T::TABLE
            )));
        }

        match self.event_type {
            ChangeKind::Insert => Ok(Change::Inserted(self.decode_new()?)),
            ChangeKind::Update => Ok(Change::Updated(self.decode_new()?)),
            ChangeKind::Delete => self
                .record_id()
                .map(Change::Deleted)
                .ok_or_else(|| StageLightError::Realtime("Delete change without an id".to_string())),
        }
    }

    fn decode_new<T: Record>(&self) -> Result<T> {
        let new = self.new.clone().ok_or_else(|| {
            StageLightError::Realtime(format!("{} change without a new row", self.event_type.as_str()))
        })?;

        Ok(serde_json::from_value(new)?)
    }
}
