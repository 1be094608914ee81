//! Gallery repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::models::gallery::{GalleryInput, GalleryItem};
use crate::utils::errors::{StageLightError, Result};
use super::{EntityRepository, ListRepository};

const COLUMNS: &str = "id, title, media_url, is_video, created_at";

#[derive(Debug, Clone)]
pub struct GalleryRepository {
    pool: PgPool,
}

impl GalleryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all gallery items, newest first
    pub async fn get_all(&self) -> Result<Vec<GalleryItem>> {
        let items = sqlx::query_as::<_, GalleryItem>(&format!(
            "SELECT {} FROM gallery ORDER BY created_at DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Newest gallery items for previews
    pub async fn latest(&self, limit: i64) -> Result<Vec<GalleryItem>> {
        let items = sqlx::query_as::<_, GalleryItem>(&format!(
            "SELECT {} FROM gallery ORDER BY created_at DESC LIMIT $1",
            COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GalleryItem>> {
        let item = sqlx::query_as::<_, GalleryItem>(&format!("SELECT {} FROM gallery WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    pub async fn create(&self, input: GalleryInput) -> Result<GalleryItem> {
        let item = sqlx::query_as::<_, GalleryItem>(&format!(
            "INSERT INTO gallery (title, media_url, is_video) VALUES ($1, $2, $3) RETURNING {}",
            COLUMNS
        ))
        .bind(input.title)
        .bind(input.media_url)
        .bind(input.is_video)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn update(&self, id: Uuid, input: GalleryInput) -> Result<GalleryItem> {
        sqlx::query_as::<_, GalleryItem>(&format!(
            "UPDATE gallery SET title = $2, media_url = $3, is_video = $4 WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .bind(input.title)
        .bind(input.media_url)
        .bind(input.is_video)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StageLightError::not_found("Gallery item", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM gallery WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StageLightError::not_found("Gallery item", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM gallery")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[async_trait]
impl ListRepository for GalleryRepository {
    type Record = GalleryItem;

    async fn get_all(&self) -> Result<Vec<GalleryItem>> {
        GalleryRepository::get_all(self).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        GalleryRepository::delete(self, id).await
    }
}

#[async_trait]
impl EntityRepository for GalleryRepository {
    type Input = GalleryInput;

    async fn create(&self, input: GalleryInput) -> Result<GalleryItem> {
        GalleryRepository::create(self, input).await
    }

    async fn update(&self, id: Uuid, input: GalleryInput) -> Result<GalleryItem> {
        GalleryRepository::update(self, id, input).await
    }
}
