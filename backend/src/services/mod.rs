//! Domain services sitting between GraphQL resolvers and repositories

pub mod auth;
pub mod likes;

pub use auth::{IdentityVerifier, JwtVerifier, VerifiedIdentity, authenticate};
pub use likes::{LikeError, LikeResult, LikeService};
