//! Team member model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use super::{Record, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    /// Role within the group, e.g. "Artistic Director"
    pub title: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    /// Core members are listed on the public core-team page
    pub is_core: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberInput {
    pub name: String,
    pub title: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub is_core: bool,
}

impl Record for TeamMember {
    const TABLE: Table = Table::TeamMembers;
    const ENTITY: &'static str = "Team member";

    fn id(&self) -> Uuid {
        self.id
    }

    fn label(&self) -> String {
        format!("{}, {}", self.name, self.title)
    }
}
