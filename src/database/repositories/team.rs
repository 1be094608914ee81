//! Team member repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::models::team::{TeamMember, TeamMemberInput};
use crate::utils::errors::{StageLightError, Result};
use super::{EntityRepository, ListRepository};

const COLUMNS: &str = "id, name, title, phone, email, photo_url, is_core, created_at";

#[derive(Debug, Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all members in the order they joined
    pub async fn get_all(&self) -> Result<Vec<TeamMember>> {
        let members = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {} FROM team_members ORDER BY created_at ASC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Core team only, same ordering
    pub async fn get_core(&self) -> Result<Vec<TeamMember>> {
        let members = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {} FROM team_members WHERE is_core = true ORDER BY created_at ASC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TeamMember>> {
        let member = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {} FROM team_members WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn create(&self, input: TeamMemberInput) -> Result<TeamMember> {
        let member = sqlx::query_as::<_, TeamMember>(&format!(
            r#"
            INSERT INTO team_members (name, title, phone, email, photo_url, is_core)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(input.name)
        .bind(input.title)
        .bind(input.phone)
        .bind(input.email)
        .bind(input.photo_url)
        .bind(input.is_core)
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn update(&self, id: Uuid, input: TeamMemberInput) -> Result<TeamMember> {
        sqlx::query_as::<_, TeamMember>(&format!(
            r#"
            UPDATE team_members
            SET name = $2, title = $3, phone = $4, email = $5, photo_url = $6, is_core = $7
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(input.name)
        .bind(input.title)
        .bind(input.phone)
        .bind(input.email)
        .bind(input.photo_url)
        .bind(input.is_core)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StageLightError::not_found("Team member", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM team_members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StageLightError::not_found("Team member", id));
        }

        Ok(())
    }

    /// Most recently added members
    pub async fn recent(&self, limit: i64) -> Result<Vec<TeamMember>> {
        let members = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {} FROM team_members ORDER BY created_at DESC LIMIT $1",
            COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM team_members")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn count_core(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM team_members WHERE is_core = true")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[async_trait]
impl ListRepository for TeamRepository {
    type Record = TeamMember;

    async fn get_all(&self) -> Result<Vec<TeamMember>> {
        TeamRepository::get_all(self).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        TeamRepository::delete(self, id).await
    }
}

#[async_trait]
impl EntityRepository for TeamRepository {
    type Input = TeamMemberInput;

    async fn create(&self, input: TeamMemberInput) -> Result<TeamMember> {
        TeamRepository::create(self, input).await
    }

    async fn update(&self, id: Uuid, input: TeamMemberInput) -> Result<TeamMember> {
        TeamRepository::update(self, id, input).await
    }
}
