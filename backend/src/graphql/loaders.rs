//! GraphQL DataLoaders for batching database queries
//!
//! Per-node fields (`Meshi.likeCount`, `Meshi.isLiked`, `Like.meshi`, ...)
//! are collected within one request tick and resolved with a single
//! `= ANY($1)` query per loader.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_graphql::dataloader::Loader;

use crate::db::{Database, MeshiRecord, MunicipalityRecord, UserRecord};
use crate::services::{LikeError, LikeService};

/// Loads meshis by id
pub struct MeshiLoader {
    db: Database,
}

impl MeshiLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i32> for MeshiLoader {
    type Value = MeshiRecord;
    type Error = Arc<anyhow::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading meshis");

        let records = self.db.meshis().get_by_ids(keys).await.map_err(Arc::new)?;
        Ok(records.into_iter().map(|r| (r.id, r)).collect())
    }
}

/// Loads municipalities by id
pub struct MunicipalityLoader {
    db: Database,
}

impl MunicipalityLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i32> for MunicipalityLoader {
    type Value = MunicipalityRecord;
    type Error = Arc<anyhow::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading municipalities");

        let records = self
            .db
            .municipalities()
            .get_by_ids(keys)
            .await
            .map_err(Arc::new)?;
        Ok(records.into_iter().map(|r| (r.id, r)).collect())
    }
}

/// Loads users by id
pub struct UserLoader {
    db: Database,
}

impl UserLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i32> for UserLoader {
    type Value = UserRecord;
    type Error = Arc<anyhow::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading users");

        let records = self.db.users().get_by_ids(keys).await.map_err(Arc::new)?;
        Ok(records.into_iter().map(|r| (r.id, r)).collect())
    }
}

/// Like count per meshi id
pub struct LikeCountLoader {
    likes: Arc<LikeService>,
}

impl LikeCountLoader {
    pub fn new(likes: Arc<LikeService>) -> Self {
        Self { likes }
    }
}

impl Loader<i32> for LikeCountLoader {
    type Value = i64;
    type Error = Arc<LikeError>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        self.likes.like_counts(keys).await.map_err(Arc::new)
    }
}

/// Number of likes given, per user id
pub struct UserLikeCountLoader {
    db: Database,
}

impl UserLikeCountLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i32> for UserLikeCountLoader {
    type Value = i64;
    type Error = Arc<anyhow::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading user like counts");
        self.db.likes().counts_for_users(keys).await.map_err(Arc::new)
    }
}

/// Key for [`LikeStateLoader`]: has `user_id` liked `meshi_id`?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LikeStateKey {
    pub user_id: i32,
    pub meshi_id: i32,
}

/// Liked state per (user, meshi) pair
pub struct LikeStateLoader {
    likes: Arc<LikeService>,
}

impl LikeStateLoader {
    pub fn new(likes: Arc<LikeService>) -> Self {
        Self { likes }
    }
}

impl Loader<LikeStateKey> for LikeStateLoader {
    type Value = bool;
    type Error = Arc<LikeError>;

    async fn load(
        &self,
        keys: &[LikeStateKey],
    ) -> Result<HashMap<LikeStateKey, Self::Value>, Self::Error> {
        let mut by_user: HashMap<i32, Vec<i32>> = HashMap::new();
        for key in keys {
            by_user.entry(key.user_id).or_default().push(key.meshi_id);
        }

        let mut states = HashMap::with_capacity(keys.len());
        for (user_id, meshi_ids) in by_user {
            let liked: HashSet<i32> = self
                .likes
                .like_states(user_id, &meshi_ids)
                .await
                .map_err(Arc::new)?;

            states.extend(meshi_ids.into_iter().map(|meshi_id| {
                (
                    LikeStateKey { user_id, meshi_id },
                    liked.contains(&meshi_id),
                )
            }));
        }

        Ok(states)
    }
}
