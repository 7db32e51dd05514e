use super::prelude::*;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// The authenticated user, or null for anonymous requests
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(auth) = ctx.try_auth_user() else {
            return Ok(None);
        };

        let db = ctx.data_unchecked::<Database>();
        let record = db.users().get_by_id(auth.user_id).await.map_err(internal_error)?;
        Ok(record.map(User::from))
    }

    /// Get a user by ID
    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<User> {
        let db = ctx.data_unchecked::<Database>();
        let id = parse_id(&id)?;

        db.users()
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .map(User::from)
            .ok_or_else(|| not_found("User"))
    }

    /// All users
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.users().list_all().await.map_err(internal_error)?;

        Ok(records.into_iter().map(User::from).collect())
    }
}
