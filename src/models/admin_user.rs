//! Admin user directory model
//!
//! These rows are managed from the settings screen. They do not grant access
//! to the admin panel; the configured allow-list does.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use super::{Record, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUserInput {
    pub email: String,
    pub name: String,
    pub is_active: bool,
}

impl Record for AdminUser {
    const TABLE: Table = Table::AdminUsers;
    const ENTITY: &'static str = "Admin user";

    fn id(&self) -> Uuid {
        self.id
    }

    fn label(&self) -> String {
        self.email.clone()
    }
}
