//! Meshi (restaurant article) database operations

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::listing::{self, ListingSql};
use crate::pagination::{FetchPlan, ListableRecord, ListingQuery, ListingStore};

/// Searchable text of a meshi: title and store name, space-joined.
pub const SEARCH_TEXT: &str = "(title || ' ' || store_name)";

/// A meshi record in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeshiRecord {
    pub id: i32,
    pub article_id: String,
    pub title: String,
    pub image_url: String,
    pub store_name: String,
    pub address: String,
    pub site_url: String,
    pub published_date: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    /// Owning municipality id
    pub municipality_meshis: Option<i32>,
}

impl ListableRecord for MeshiRecord {
    fn id(&self) -> i32 {
        self.id
    }

    fn ordering_value(&self) -> DateTime<Utc> {
        self.published_date
    }
}

/// Meshi repository for database operations
pub struct MeshiRepository {
    pool: PgPool,
}

impl MeshiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a single meshi by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<MeshiRecord>> {
        let record = sqlx::query_as::<_, MeshiRecord>("SELECT * FROM meshis WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Get meshis by a set of IDs (unordered)
    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<MeshiRecord>> {
        let records = sqlx::query_as::<_, MeshiRecord>("SELECT * FROM meshis WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// All meshis of a municipality, newest publication first
    pub async fn list_by_municipality(&self, municipality_id: i32) -> Result<Vec<MeshiRecord>> {
        let records = sqlx::query_as::<_, MeshiRecord>(
            r#"
            SELECT * FROM meshis
            WHERE municipality_meshis = $1
            ORDER BY published_date DESC, id DESC
            "#,
        )
        .bind(municipality_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    fn listing_sql(query: &ListingQuery) -> ListingSql {
        ListingSql::new("meshis").search(SEARCH_TEXT, query)
    }
}

#[async_trait]
impl ListingStore for MeshiRepository {
    type Record = MeshiRecord;

    async fn count(&self, query: &ListingQuery) -> Result<i64> {
        listing::count(&self.pool, &Self::listing_sql(query)).await
    }

    async fn fetch(&self, plan: &FetchPlan<'_>) -> Result<Vec<MeshiRecord>> {
        listing::fetch(&self.pool, Self::listing_sql(plan.query), plan).await
    }

    async fn ordering_value_of(&self, id: i32) -> Result<Option<DateTime<Utc>>> {
        let published = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT published_date FROM meshis WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(published)
    }
}
