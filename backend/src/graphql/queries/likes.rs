use super::prelude::*;

#[derive(Default)]
pub struct LikeQueries;

#[Object]
impl LikeQueries {
    /// The caller's likes, newest first
    #[graphql(guard = "AuthGuard")]
    async fn my_likes(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<LikeConnection> {
        let user = ctx.auth_user()?;
        let likes = ctx.data_unchecked::<Arc<LikeService>>();
        let request = PageRequest::new(first, after, None).map_err(|e| e.extend())?;

        let connection = likes
            .user_likes(user.user_id, &request)
            .await
            .map_err(|e| e.extend())?;

        Ok(connection.into())
    }
}
