//! Message repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::models::message::{Message, MessageInput};
use crate::utils::errors::{StageLightError, Result};
use super::{InboxRepository, ListRepository};

const COLUMNS: &str = "id, name, email, message, is_read, created_at";

#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inbox, newest first
    pub async fn get_all(&self) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            "SELECT {} FROM messages ORDER BY created_at DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(&format!("SELECT {} FROM messages WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    /// Store a submission from a public form
    pub async fn create(&self, input: MessageInput) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(&format!(
            "INSERT INTO messages (name, email, message) VALUES ($1, $2, $3) RETURNING {}",
            COLUMNS
        ))
        .bind(input.name)
        .bind(input.email)
        .bind(input.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn mark_as_read(&self, id: Uuid) -> Result<Message> {
        sqlx::query_as::<_, Message>(&format!(
            "UPDATE messages SET is_read = true WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StageLightError::not_found("Message", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StageLightError::not_found("Message", id));
        }

        Ok(())
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            "SELECT {} FROM messages ORDER BY created_at DESC LIMIT $1",
            COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn count_unread(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE is_read = false")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[async_trait]
impl ListRepository for MessageRepository {
    type Record = Message;

    async fn get_all(&self) -> Result<Vec<Message>> {
        MessageRepository::get_all(self).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        MessageRepository::delete(self, id).await
    }
}

#[async_trait]
impl InboxRepository for MessageRepository {
    async fn mark_as_read(&self, id: Uuid) -> Result<Message> {
        MessageRepository::mark_as_read(self, id).await
    }
}
