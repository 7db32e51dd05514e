//! Like database operations

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::listing::{self, ListingSql};
use crate::pagination::{FetchPlan, ListableRecord, ListingQuery, ListingStore, SqlValue};

/// A like record in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LikeRecord {
    pub id: i32,
    pub user_id: i32,
    pub meshi_id: i32,
    pub created_at: DateTime<Utc>,
}

impl ListableRecord for LikeRecord {
    fn id(&self) -> i32 {
        self.id
    }

    fn ordering_value(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Likes repository for database operations
pub struct LikesRepository {
    pool: PgPool,
}

impl LikesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a like. Fails with a unique violation if it already exists.
    pub async fn create(&self, user_id: i32, meshi_id: i32) -> Result<LikeRecord> {
        let record = sqlx::query_as::<_, LikeRecord>(
            r#"
            INSERT INTO likes (user_id, meshi_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(meshi_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Delete a like, returning whether a row was removed
    pub async fn delete(&self, user_id: i32, meshi_id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND meshi_id = $2")
            .bind(user_id)
            .bind(meshi_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of likes given by a user
    pub async fn count_for_user(&self, user_id: i32) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Like counts for several users; users without likes map to 0
    pub async fn counts_for_users(&self, user_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        let rows = sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT user_id, COUNT(*)
            FROM likes
            WHERE user_id = ANY($1)
            GROUP BY user_id
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(fill_zeros(user_ids, rows))
    }

    /// Like counts for several meshis; meshis without likes map to 0
    pub async fn counts_for_meshis(&self, meshi_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        let rows = sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT meshi_id, COUNT(*)
            FROM likes
            WHERE meshi_id = ANY($1)
            GROUP BY meshi_id
            "#,
        )
        .bind(meshi_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(fill_zeros(meshi_ids, rows))
    }

    /// Which of `meshi_ids` the user has liked
    pub async fn liked_meshi_ids(&self, user_id: i32, meshi_ids: &[i32]) -> Result<HashSet<i32>> {
        let liked = sqlx::query_scalar::<_, i32>(
            "SELECT meshi_id FROM likes WHERE user_id = $1 AND meshi_id = ANY($2)",
        )
        .bind(user_id)
        .bind(meshi_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(liked.into_iter().collect())
    }

    /// Paginated view over one user's likes
    pub fn for_user(&self, user_id: i32) -> UserLikes {
        UserLikes {
            pool: self.pool.clone(),
            user_id,
        }
    }
}

fn fill_zeros(keys: &[i32], rows: Vec<(i32, i64)>) -> HashMap<i32, i64> {
    let mut counts: HashMap<i32, i64> = keys.iter().map(|k| (*k, 0)).collect();
    counts.extend(rows);
    counts
}

/// Listing store over the likes of a single user.
///
/// The like listing has no search path; a search query is ignored.
pub struct UserLikes {
    pool: PgPool,
    user_id: i32,
}

impl UserLikes {
    fn listing_sql(&self) -> ListingSql {
        ListingSql::new("likes").filter_eq("user_id", SqlValue::Int(self.user_id))
    }
}

#[async_trait]
impl ListingStore for UserLikes {
    type Record = LikeRecord;

    async fn count(&self, _query: &ListingQuery) -> Result<i64> {
        listing::count(&self.pool, &self.listing_sql()).await
    }

    async fn fetch(&self, plan: &FetchPlan<'_>) -> Result<Vec<LikeRecord>> {
        listing::fetch(&self.pool, self.listing_sql(), plan).await
    }

    async fn ordering_value_of(&self, id: i32) -> Result<Option<DateTime<Utc>>> {
        let created = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT created_at FROM likes WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(self.user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_zeros_covers_every_key() {
        let counts = fill_zeros(&[1, 2, 3], vec![(2, 5)]);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[&1], 0);
        assert_eq!(counts[&2], 5);
        assert_eq!(counts[&3], 0);
    }
}
