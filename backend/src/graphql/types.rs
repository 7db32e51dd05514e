//! GraphQL types for the meshi API

use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, ID, InputObject, MaybeUndefined, Result, SimpleObject};
use chrono::{DateTime, Utc};

use super::auth::AuthExt;
use super::errors::{internal_error, not_found};
use super::loaders::{
    LikeCountLoader, LikeStateKey, LikeStateLoader, MeshiLoader, MunicipalityLoader, UserLikeCountLoader,
    UserLoader,
};
use crate::db::{
    Database, LikeRecord, MeshiRecord, MunicipalityRecord, UpdateUser, UserRecord,
};
use crate::define_connection;

// ============================================================================
// Meshi
// ============================================================================

/// A restaurant article
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Meshi {
    #[graphql(skip)]
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
    #[graphql(skip)]
    pub municipality_id: Option<i32>,
}

impl From<MeshiRecord> for Meshi {
    fn from(r: MeshiRecord) -> Self {
        Self {
            id: r.id,
            article_id: r.article_id,
            title: r.title,
            image_url: r.image_url,
            store_name: r.store_name,
            address: r.address,
            site_url: r.site_url,
            published_date: r.published_date,
            latitude: r.latitude,
            longitude: r.longitude,
            created_at: r.created_at,
            municipality_id: r.municipality_meshis,
        }
    }
}

#[ComplexObject]
impl Meshi {
    async fn id(&self) -> ID {
        ID::from(self.id.to_string())
    }

    async fn municipality(&self, ctx: &Context<'_>) -> Result<Option<Municipality>> {
        let Some(municipality_id) = self.municipality_id else {
            return Ok(None);
        };

        let loader = ctx.data_unchecked::<DataLoader<MunicipalityLoader>>();
        let record = loader.load_one(municipality_id).await.map_err(internal_error)?;
        Ok(record.map(Municipality::from))
    }

    /// Whether the caller has liked this meshi; false when unauthenticated
    async fn is_liked(&self, ctx: &Context<'_>) -> Result<bool> {
        let Some(user) = ctx.try_auth_user() else {
            return Ok(false);
        };

        let loader = ctx.data_unchecked::<DataLoader<LikeStateLoader>>();
        let key = LikeStateKey {
            user_id: user.user_id,
            meshi_id: self.id,
        };
        let liked = loader.load_one(key).await.map_err(internal_error)?;
        Ok(liked.unwrap_or(false))
    }

    async fn like_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let loader = ctx.data_unchecked::<DataLoader<LikeCountLoader>>();
        let count = loader.load_one(self.id).await.map_err(internal_error)?;
        Ok(count.unwrap_or(0))
    }
}

define_connection!(MeshiConnection, MeshiEdge, Meshi, MeshiRecord);

// ============================================================================
// Municipality
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Municipality {
    #[graphql(skip)]
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<MunicipalityRecord> for Municipality {
    fn from(r: MunicipalityRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            created_at: r.created_at,
        }
    }
}

#[ComplexObject]
impl Municipality {
    async fn id(&self) -> ID {
        ID::from(self.id.to_string())
    }

    /// Meshis in this municipality, newest publication first
    async fn meshis(&self, ctx: &Context<'_>) -> Result<Vec<Meshi>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .meshis()
            .list_by_municipality(self.id)
            .await
            .map_err(internal_error)?;

        Ok(records.into_iter().map(Meshi::from).collect())
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct User {
    #[graphql(skip)]
    pub id: i32,
    pub firebase_uid: Option<String>,
    pub email: String,
    pub name: String,
    pub display_name: String,
    #[graphql(name = "iconImageURL")]
    pub icon_image_url: Option<String>,
    pub description: Option<String>,
    pub twitter_profile_url: Option<String>,
    pub auth_provider: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            firebase_uid: r.firebase_uid,
            email: r.email,
            name: r.name,
            display_name: r.display_name,
            icon_image_url: r.icon_image_url,
            description: r.description,
            twitter_profile_url: r.twitter_profile_url,
            auth_provider: r.auth_provider,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[ComplexObject]
impl User {
    async fn id(&self) -> ID {
        ID::from(self.id.to_string())
    }

    /// Number of meshis this user has liked
    async fn like_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let loader = ctx.data_unchecked::<DataLoader<UserLikeCountLoader>>();
        let count = loader.load_one(self.id).await.map_err(internal_error)?;
        Ok(count.unwrap_or(0))
    }
}

/// Input for updating the current user's profile
///
/// `name` and `displayName` are ignored when empty. The nullable profile
/// fields are cleared by an explicit `null` and left alone when omitted.
#[derive(Debug, Default, InputObject)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub display_name: Option<String>,
    #[graphql(name = "iconImageURL")]
    pub icon_image_url: MaybeUndefined<String>,
    pub description: MaybeUndefined<String>,
    pub twitter_profile_url: MaybeUndefined<String>,
}

impl From<UpdateUserInput> for UpdateUser {
    fn from(input: UpdateUserInput) -> Self {
        Self {
            name: input.name.filter(|s| !s.is_empty()),
            display_name: input.display_name.filter(|s| !s.is_empty()),
            icon_image_url: input.icon_image_url.into(),
            description: input.description.into(),
            twitter_profile_url: input.twitter_profile_url.into(),
        }
    }
}

// ============================================================================
// Like
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Like {
    #[graphql(skip)]
    pub id: i32,
    pub created_at: DateTime<Utc>,
    #[graphql(skip)]
    pub user_id: i32,
    #[graphql(skip)]
    pub meshi_id: i32,
}

impl From<LikeRecord> for Like {
    fn from(r: LikeRecord) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at,
            user_id: r.user_id,
            meshi_id: r.meshi_id,
        }
    }
}

#[ComplexObject]
impl Like {
    async fn id(&self) -> ID {
        ID::from(self.id.to_string())
    }

    async fn meshi(&self, ctx: &Context<'_>) -> Result<Meshi> {
        let loader = ctx.data_unchecked::<DataLoader<MeshiLoader>>();
        loader
            .load_one(self.meshi_id)
            .await
            .map_err(internal_error)?
            .map(Meshi::from)
            .ok_or_else(|| not_found("Meshi"))
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        let loader = ctx.data_unchecked::<DataLoader<UserLoader>>();
        loader
            .load_one(self.user_id)
            .await
            .map_err(internal_error)?
            .map(User::from)
            .ok_or_else(|| not_found("User"))
    }
}

define_connection!(LikeConnection, LikeEdge, Like, LikeRecord);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_update_input_skips_empty_names() {
        let update = UpdateUser::from(UpdateUserInput {
            name: Some(String::new()),
            display_name: Some("Hanako".into()),
            ..Default::default()
        });
        assert_eq!(update.name, None);
        assert_eq!(update.display_name.as_deref(), Some("Hanako"));
    }

    #[test]
    fn test_update_input_distinguishes_null_from_omitted() {
        let update = UpdateUser::from(UpdateUserInput {
            icon_image_url: MaybeUndefined::Null,
            description: MaybeUndefined::Value("ramen lover".into()),
            ..Default::default()
        });
        assert_eq!(update.icon_image_url, Some(None));
        assert_eq!(update.description, Some(Some("ramen lover".to_string())));
        assert_eq!(update.twitter_profile_url, None);
    }
}
