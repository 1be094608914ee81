//! Event repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::models::event::{Event, EventInput};
use crate::utils::errors::{StageLightError, Result};
use super::{EntityRepository, ListRepository};

const COLUMNS: &str = "id, title, description, date, time, venue, image_url, is_upcoming, created_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all events, newest date first
    pub async fn get_all(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events ORDER BY date DESC, created_at DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Get events flagged as upcoming, soonest first
    pub async fn get_upcoming(&self, limit: Option<i64>) -> Result<Vec<Event>> {
        let limit = limit.unwrap_or(50);
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE is_upcoming = true ORDER BY date ASC, created_at ASC LIMIT $1",
            COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {} FROM events WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Create a new event
    pub async fn create(&self, input: EventInput) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, date, time, venue, image_url, is_upcoming)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(input.title)
        .bind(input.description)
        .bind(input.date)
        .bind(input.time)
        .bind(input.venue)
        .bind(input.image_url)
        .bind(input.is_upcoming)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event
    pub async fn update(&self, id: Uuid, input: EventInput) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                date = $4,
                time = $5,
                venue = $6,
                image_url = $7,
                is_upcoming = $8
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(input.title)
        .bind(input.description)
        .bind(input.date)
        .bind(input.time)
        .bind(input.venue)
        .bind(input.image_url)
        .bind(input.is_upcoming)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StageLightError::not_found("Event", id))
    }

    /// Delete event
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StageLightError::not_found("Event", id));
        }

        Ok(())
    }

    /// Most recently created events
    pub async fn recent(&self, limit: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events ORDER BY created_at DESC LIMIT $1",
            COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count total events
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count events flagged as upcoming
    pub async fn count_upcoming(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events WHERE is_upcoming = true")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[async_trait]
impl ListRepository for EventRepository {
    type Record = Event;

    async fn get_all(&self) -> Result<Vec<Event>> {
        EventRepository::get_all(self).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        EventRepository::delete(self, id).await
    }
}

#[async_trait]
impl EntityRepository for EventRepository {
    type Input = EventInput;

    async fn create(&self, input: EventInput) -> Result<Event> {
        EventRepository::create(self, input).await
    }

    async fn update(&self, id: Uuid, input: EventInput) -> Result<Event> {
        EventRepository::update(self, id, input).await
    }
}
