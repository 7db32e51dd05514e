//! GraphQL API
//!
//! Queries and mutations live in domain-specific files under `queries/` and
//! `mutations/`, each a `#[derive(Default)]` struct with an `#[Object]` impl,
//! merged into the roots by `schema.rs`.

pub mod auth;
pub mod errors;
pub mod loaders;
pub mod mutations;
pub mod pagination;
pub mod queries;
mod schema;
pub mod types;

pub use auth::AuthUser;
pub use schema::{MeshiSchema, MutationRoot, QueryRoot, build_schema};
