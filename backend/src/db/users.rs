//! Users repository
//!
//! Users are provisioned on first authenticated request, keyed by the
//! identity provider's uid.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

// ============================================================================
// User Records
// ============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub firebase_uid: Option<String>,
    pub email: String,
    pub name: String,
    pub display_name: String,
    pub icon_image_url: Option<String>,
    pub description: Option<String>,
    pub twitter_profile_url: Option<String>,
    pub auth_provider: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub firebase_uid: String,
    pub email: String,
    pub name: String,
    pub display_name: String,
    pub auth_provider: Vec<String>,
}

/// Partial update. `None` leaves a column untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub icon_image_url: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub twitter_profile_url: Option<Option<String>>,
}

impl UpdateUser {
    /// SET assignments with `$n` placeholders starting at 1, plus their values.
    fn assignments(&self) -> (Vec<String>, Vec<Option<String>>) {
        let mut sets = Vec::new();
        let mut values = Vec::new();

        let mut push = |column: &str, value: Option<String>| {
            values.push(value);
            sets.push(format!("{} = ${}", column, values.len()));
        };

        if let Some(ref name) = self.name {
            push("name", Some(name.clone()));
        }
        if let Some(ref display_name) = self.display_name {
            push("display_name", Some(display_name.clone()));
        }
        if let Some(ref icon) = self.icon_image_url {
            push("icon_image_url", icon.clone());
        }
        if let Some(ref description) = self.description {
            push("description", description.clone());
        }
        if let Some(ref twitter) = self.twitter_profile_url {
            push("twitter_profile_url", twitter.clone());
        }

        (sets, values)
    }
}

// ============================================================================
// Repository
// ============================================================================

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<UserRecord>> {
        let records = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    pub async fn get_by_firebase_uid(&self, uid: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE firebase_uid = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn list_all(&self) -> Result<Vec<UserRecord>> {
        let records = sqlx::query_as::<_, UserRecord>("SELECT * FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Insert a user. A concurrent insert for the same uid returns the existing row.
    pub async fn create(&self, user: CreateUser) -> Result<UserRecord> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (firebase_uid, email, name, display_name, auth_provider, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (firebase_uid) DO UPDATE SET firebase_uid = EXCLUDED.firebase_uid
            RETURNING *
            "#,
        )
        .bind(&user.firebase_uid)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.display_name)
        .bind(&user.auth_provider)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Apply a partial update and return the new row (None if the user is gone).
    pub async fn update(&self, id: i32, update: UpdateUser) -> Result<Option<UserRecord>> {
        let (mut sets, values) = update.assignments();
        sets.push("updated_at = NOW()".to_string());

        let sql = format!(
            "UPDATE users SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            values.len() + 1
        );

        let mut query = sqlx::query_as::<_, UserRecord>(&sql);
        for value in &values {
            query = query.bind(value.as_deref());
        }

        let record = query.bind(id).fetch_optional(&self.pool).await?;
        Ok(record)
    }
}
