//! Caller identity inside GraphQL resolvers
//!
//! The HTTP layer authenticates the bearer token and attaches an [`AuthUser`]
//! to the request data. Resolvers read it through [`AuthExt`], or require it
//! up front with `#[graphql(guard = "AuthGuard")]`.

use async_graphql::{Context, ErrorExtensions, Result};

use crate::db::UserRecord;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: i32,
    pub firebase_uid: Option<String>,
    pub email: String,
}

impl From<&UserRecord> for AuthUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.id,
            firebase_uid: user.firebase_uid.clone(),
            email: user.email.clone(),
        }
    }
}

pub trait AuthExt {
    /// The caller, or an `UNAUTHENTICATED` error for anonymous requests
    fn auth_user(&self) -> Result<&AuthUser>;

    /// The caller, if the request carried a valid token
    fn try_auth_user(&self) -> Option<&AuthUser>;
}

impl AuthExt for Context<'_> {
    fn auth_user(&self) -> Result<&AuthUser> {
        self.try_auth_user().ok_or_else(|| {
            async_graphql::Error::new("Authentication required")
                .extend_with(|_, e| e.set("code", "UNAUTHENTICATED"))
        })
    }

    fn try_auth_user(&self) -> Option<&AuthUser> {
        self.data_opt::<AuthUser>()
    }
}

/// Rejects anonymous callers before the resolver runs
pub struct AuthGuard;

impl async_graphql::Guard for AuthGuard {
    fn check(&self, ctx: &Context<'_>) -> impl std::future::Future<Output = Result<()>> + Send {
        let result = ctx.auth_user().map(|_| ());
        async move { result }
    }
}
