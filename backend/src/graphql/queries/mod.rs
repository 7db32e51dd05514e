pub mod likes;
pub mod meshis;
pub mod municipalities;
pub mod users;

pub use likes::LikeQueries;
pub use meshis::MeshiQueries;
pub use municipalities::MunicipalityQueries;
pub use users::UserQueries;

pub(crate) mod prelude {
    pub(crate) use std::sync::Arc;

    pub(crate) use async_graphql::{Context, ErrorExtensions, ID, Object, Result};

    pub(crate) use crate::db::*;
    pub(crate) use crate::graphql::auth::{AuthExt, AuthGuard};
    pub(crate) use crate::graphql::errors::{internal_error, not_found, parse_id};
    pub(crate) use crate::graphql::types::*;
    pub(crate) use crate::pagination::PageRequest;
    pub(crate) use crate::services::LikeService;
}
