//! Like operations: like/unlike, per-user listing, batched like state

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::db::{Database, LikeRecord, is_foreign_key_violation, is_unique_violation};
use crate::pagination::{Connection, LIKE_LISTING, PageRequest, PaginationResult, paginate};

#[derive(Debug, Error)]
pub enum LikeError {
    #[error("meshi is already liked")]
    AlreadyLiked,

    #[error("like not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

pub type LikeResult<T> = Result<T, LikeError>;

pub struct LikeService {
    db: Database,
}

impl LikeService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record that `user_id` likes `meshi_id`.
    pub async fn like_meshi(&self, user_id: i32, meshi_id: i32) -> LikeResult<LikeRecord> {
        tracing::info!(user_id, meshi_id, "Liking meshi");

        match self.db.likes().create(user_id, meshi_id).await {
            Ok(like) => {
                tracing::info!(user_id, meshi_id, like_id = like.id, "Meshi liked");
                Ok(like)
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(user_id, meshi_id, "Meshi already liked");
                Err(LikeError::AlreadyLiked)
            }
            Err(e) if is_foreign_key_violation(&e) => {
                tracing::warn!(user_id, meshi_id, "Like target does not exist");
                Err(LikeError::NotFound)
            }
            Err(e) => {
                tracing::error!(user_id, meshi_id, error = %e, "Failed to like meshi");
                Err(LikeError::Database(e))
            }
        }
    }

    /// Remove a like. Fails with [`LikeError::NotFound`] if there was none.
    pub async fn unlike_meshi(&self, user_id: i32, meshi_id: i32) -> LikeResult<()> {
        tracing::info!(user_id, meshi_id, "Unliking meshi");

        let removed = self.db.likes().delete(user_id, meshi_id).await.map_err(|e| {
            tracing::error!(user_id, meshi_id, error = %e, "Failed to unlike meshi");
            LikeError::Database(e)
        })?;

        if !removed {
            tracing::warn!(user_id, meshi_id, "No like to remove");
            return Err(LikeError::NotFound);
        }

        tracing::info!(user_id, meshi_id, "Meshi unliked");
        Ok(())
    }

    /// One page of the user's likes, newest first.
    pub async fn user_likes(
        &self,
        user_id: i32,
        request: &PageRequest,
    ) -> PaginationResult<Connection<LikeRecord>> {
        let store = self.db.likes().for_user(user_id);
        let connection = paginate(&store, &LIKE_LISTING, request).await?;

        tracing::debug!(
            user_id,
            returned = connection.edges.len(),
            total = connection.total_count,
            has_next = connection.page_info.has_next_page,
            "Fetched user likes"
        );

        Ok(connection)
    }

    /// Which of `meshi_ids` the user has liked
    pub async fn like_states(&self, user_id: i32, meshi_ids: &[i32]) -> LikeResult<HashSet<i32>> {
        let liked = self.db.likes().liked_meshi_ids(user_id, meshi_ids).await?;
        tracing::debug!(user_id, requested = meshi_ids.len(), liked = liked.len(), "Like states");
        Ok(liked)
    }

    /// Like counts per meshi, zero for meshis without likes
    pub async fn like_counts(&self, meshi_ids: &[i32]) -> LikeResult<HashMap<i32, i64>> {
        let counts = self.db.likes().counts_for_meshis(meshi_ids).await?;
        tracing::debug!(requested = meshi_ids.len(), "Like counts");
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_database_errors_convert() {
        let err: LikeError = anyhow::anyhow!("connection reset").into();
        assert_matches!(err, LikeError::Database(_));
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(LikeError::AlreadyLiked.to_string(), "meshi is already liked");
        assert_eq!(LikeError::NotFound.to_string(), "like not found");
    }
}
