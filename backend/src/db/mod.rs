//! Database connection and repositories

pub mod likes;
pub mod listing;
pub mod meshis;
pub mod municipalities;
pub mod users;

use std::time::Duration;

use anyhow::Result;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use likes::{LikeRecord, LikesRepository, UserLikes};
pub use listing::ListingSql;
pub use meshis::{MeshiRecord, MeshiRepository};
pub use municipalities::{MunicipalityRecord, MunicipalityRepository};
pub use users::{CreateUser, UpdateUser, UserRecord, UserRepository};

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres error code for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new database connection pool
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a meshi (restaurant) repository
    pub fn meshis(&self) -> MeshiRepository {
        MeshiRepository::new(self.pool.clone())
    }

    /// Get a municipality repository
    pub fn municipalities(&self) -> MunicipalityRepository {
        MunicipalityRepository::new(self.pool.clone())
    }

    /// Get a user repository
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Get a likes repository
    pub fn likes(&self) -> LikesRepository {
        LikesRepository::new(self.pool.clone())
    }
}

/// True if `err` wraps a unique constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    has_db_code(err, UNIQUE_VIOLATION)
}

/// True if `err` wraps a foreign key violation.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    has_db_code(err, FOREIGN_KEY_VIOLATION)
}

fn has_db_code(err: &anyhow::Error, code: &str) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}
