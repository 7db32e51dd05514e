use super::prelude::*;

#[derive(Default)]
pub struct MunicipalityQueries;

#[Object]
impl MunicipalityQueries {
    /// All municipalities
    async fn municipalities(&self, ctx: &Context<'_>) -> Result<Vec<Municipality>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.municipalities().list_all().await.map_err(internal_error)?;

        Ok(records.into_iter().map(Municipality::from).collect())
    }

    /// Get a municipality by ID
    async fn municipality(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Municipality>> {
        let db = ctx.data_unchecked::<Database>();
        let id = parse_id(&id)?;

        let record = db.municipalities().get_by_id(id).await.map_err(internal_error)?;
        Ok(record.map(Municipality::from))
    }
}
