//! Department repository (read-only)

use sqlx::PgPool;
use uuid::Uuid;
use crate::models::department::Department;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            "SELECT id, name, description, created_at FROM departments ORDER BY name ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT id, name, description, created_at FROM departments WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(department)
    }
}
