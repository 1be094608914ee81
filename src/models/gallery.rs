//! Gallery item model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use super::{Record, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GalleryItem {
    pub id: Uuid,
    pub title: String,
    pub media_url: String,
    pub is_video: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryInput {
    pub title: String,
    pub media_url: String,
    pub is_video: bool,
}

impl Record for GalleryItem {
    const TABLE: Table = Table::Gallery;
    const ENTITY: &'static str = "Gallery item";

    fn id(&self) -> Uuid {
        self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }
}
