//! Admin user directory repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::models::admin_user::{AdminUser, AdminUserInput};
use crate::utils::errors::{StageLightError, Result};
use super::{EntityRepository, ListRepository};

const COLUMNS: &str = "id, email, name, is_active, created_at";

#[derive(Debug, Clone)]
pub struct AdminUserRepository {
    pool: PgPool,
}

impl AdminUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<AdminUser>> {
        let admins = sqlx::query_as::<_, AdminUser>(&format!(
            "SELECT {} FROM admin_users ORDER BY created_at DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(admins)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>> {
        let admin = sqlx::query_as::<_, AdminUser>(&format!(
            "SELECT {} FROM admin_users WHERE email = $1",
            COLUMNS
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    pub async fn create(&self, input: AdminUserInput) -> Result<AdminUser> {
        let admin = sqlx::query_as::<_, AdminUser>(&format!(
            "INSERT INTO admin_users (email, name, is_active) VALUES ($1, $2, $3) RETURNING {}",
            COLUMNS
        ))
        .bind(input.email)
        .bind(input.name)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }

    pub async fn update(&self, id: Uuid, input: AdminUserInput) -> Result<AdminUser> {
        sqlx::query_as::<_, AdminUser>(&format!(
            "UPDATE admin_users SET email = $2, name = $3, is_active = $4 WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .bind(input.email)
        .bind(input.name)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StageLightError::not_found("Admin user", id))
    }

    /// Toggle the active flag without touching other columns
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<AdminUser> {
        sqlx::query_as::<_, AdminUser>(&format!(
            "UPDATE admin_users SET is_active = $2 WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StageLightError::not_found("Admin user", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StageLightError::not_found("Admin user", id));
        }

        Ok(())
    }
}

#[async_trait]
impl ListRepository for AdminUserRepository {
    type Record = AdminUser;

    async fn get_all(&self) -> Result<Vec<AdminUser>> {
        AdminUserRepository::get_all(self).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        AdminUserRepository::delete(self, id).await
    }
}

#[async_trait]
impl EntityRepository for AdminUserRepository {
    type Input = AdminUserInput;

    async fn create(&self, input: AdminUserInput) -> Result<AdminUser> {
        AdminUserRepository::create(self, input).await
    }

    async fn update(&self, id: Uuid, input: AdminUserInput) -> Result<AdminUser> {
        AdminUserRepository::update(self, id, input).await
    }
}
