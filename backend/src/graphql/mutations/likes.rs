use super::prelude::*;

#[derive(Default)]
pub struct LikeMutations;

#[Object]
impl LikeMutations {
    /// Like a meshi as the caller
    #[graphql(guard = "AuthGuard")]
    async fn like_meshi(&self, ctx: &Context<'_>, meshi_id: ID) -> Result<Like> {
        let user = ctx.auth_user()?;
        let likes = ctx.data_unchecked::<Arc<LikeService>>();
        let meshi_id = parse_id(&meshi_id)?;

        let like = likes
            .like_meshi(user.user_id, meshi_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(Like::from(like))
    }

    /// Remove the caller's like from a meshi
    #[graphql(guard = "AuthGuard")]
    async fn unlike_meshi(&self, ctx: &Context<'_>, meshi_id: ID) -> Result<bool> {
        let user = ctx.auth_user()?;
        let likes = ctx.data_unchecked::<Arc<LikeService>>();
        let meshi_id = parse_id(&meshi_id)?;

        likes
            .unlike_meshi(user.user_id, meshi_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(true)
    }
}
