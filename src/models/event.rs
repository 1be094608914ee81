//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use super::{Record, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    /// Free-text show time as entered by the admin
    pub time: String,
    pub venue: String,
    pub image_url: String,
    pub is_upcoming: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated event fields, written on both create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub venue: String,
    pub image_url: String,
    pub is_upcoming: bool,
}

impl Record for Event {
    const TABLE: Table = Table::Events;
    const ENTITY: &'static str = "Event";

    fn id(&self) -> Uuid {
        self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.title, self.date)
    }
}
