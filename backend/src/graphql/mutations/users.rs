use super::prelude::*;

#[derive(Default)]
pub struct UserMutations;

#[Object]
impl UserMutations {
    /// Update the caller's profile
    #[graphql(guard = "AuthGuard")]
    async fn update_user(&self, ctx: &Context<'_>, input: UpdateUserInput) -> Result<User> {
        let user = ctx.auth_user()?;
        let db = ctx.data_unchecked::<Database>();

        tracing::info!(user_id = user.user_id, "Updating user profile");

        db.users()
            .update(user.user_id, UpdateUser::from(input))
            .await
            .map_err(internal_error)?
            .map(User::from)
            .ok_or_else(|| not_found("User"))
    }
}
