//! GraphQL schema definition
//!
//! Queries and mutations are split per domain and merged into the roots here.

use std::sync::Arc;

use async_graphql::dataloader::DataLoader;
use async_graphql::extensions::Tracing;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use super::loaders::{
    LikeCountLoader, LikeStateLoader, MeshiLoader, MunicipalityLoader, UserLikeCountLoader,
    UserLoader,
};
use super::mutations::{LikeMutations, UserMutations};
use super::queries::{LikeQueries, MeshiQueries, MunicipalityQueries, UserQueries};
use crate::db::Database;
use crate::services::LikeService;

/// The GraphQL schema type
pub type MeshiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(MeshiQueries, MunicipalityQueries, UserQueries, LikeQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(LikeMutations, UserMutations);

/// Build the GraphQL schema with all resolvers and loaders
pub fn build_schema(db: Database) -> MeshiSchema {
    let likes = Arc::new(LikeService::new(db.clone()));

    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(DataLoader::new(MeshiLoader::new(db.clone()), tokio::spawn))
        .data(DataLoader::new(MunicipalityLoader::new(db.clone()), tokio::spawn))
        .data(DataLoader::new(UserLoader::new(db.clone()), tokio::spawn))
        .data(DataLoader::new(UserLikeCountLoader::new(db.clone()), tokio::spawn))
        .data(DataLoader::new(LikeCountLoader::new(likes.clone()), tokio::spawn))
        .data(DataLoader::new(LikeStateLoader::new(likes.clone()), tokio::spawn))
        .data(likes)
        .data(db)
        .extension(Tracing)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_schema() -> MeshiSchema {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/meshi_test")
            .unwrap();
        build_schema(Database::new(pool))
    }

    #[tokio::test]
    async fn test_sdl_exposes_connection_fields() {
        let sdl = lazy_schema().sdl();

        assert!(sdl.contains("meshis(first: Int, after: String, query: String): MeshiConnection!"));
        assert!(sdl.contains("myLikes(first: Int, after: String): LikeConnection!"));
        assert!(sdl.contains("totalCount: Int!"));
        assert!(sdl.contains("iconImageURL: String"));
        assert!(sdl.contains("unlikeMeshi(meshiId: ID!): Boolean!"));
    }

    #[tokio::test]
    async fn test_invalid_cursor_is_reported_before_touching_the_store() {
        let response = lazy_schema()
            .execute(r#"{ meshis(first: 2, after: "not-a-cursor") { totalCount } }"#)
            .await;

        assert_eq!(response.errors.len(), 1);
        let code = response.errors[0]
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code").cloned());
        assert_eq!(code, Some(async_graphql::Value::from("INVALID_CURSOR")));
    }

    #[tokio::test]
    async fn test_non_positive_page_size_is_rejected() {
        let response = lazy_schema()
            .execute("{ meshis(first: 0) { totalCount } }")
            .await;

        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("page size"));
    }

    #[tokio::test]
    async fn test_my_likes_requires_authentication() {
        let response = lazy_schema()
            .execute("{ myLikes { totalCount } }")
            .await;

        assert_eq!(response.errors.len(), 1);
        let code = response.errors[0]
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code").cloned());
        assert_eq!(code, Some(async_graphql::Value::from("UNAUTHENTICATED")));
    }
}
