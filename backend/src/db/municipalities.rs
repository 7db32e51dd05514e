//! Municipality database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// A municipality record in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MunicipalityRecord {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct MunicipalityRepository {
    pool: PgPool,
}

impl MunicipalityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<MunicipalityRecord>> {
        let record = sqlx::query_as::<_, MunicipalityRecord>(
            "SELECT id, name, created_at FROM municipalities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<MunicipalityRecord>> {
        let records = sqlx::query_as::<_, MunicipalityRecord>(
            "SELECT id, name, created_at FROM municipalities WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_all(&self) -> Result<Vec<MunicipalityRecord>> {
        let records = sqlx::query_as::<_, MunicipalityRecord>(
            "SELECT id, name, created_at FROM municipalities ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
