//! Message model
//!
//! Messages come from the public contact and join-us forms. Only admins
//! change the read flag or delete them.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use super::{Record, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Record for Message {
    const TABLE: Table = Table::Messages;
    const ENTITY: &'static str = "Message";

    fn id(&self) -> Uuid {
        self.id
    }

    fn label(&self) -> String {
        format!("from {}", self.name)
    }
}
