use super::prelude::*;
use crate::pagination::{MESHI_LISTING, paginate};

#[derive(Default)]
pub struct MeshiQueries;

#[Object]
impl MeshiQueries {
    /// Get a meshi by ID
    async fn meshi(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Meshi>> {
        let db = ctx.data_unchecked::<Database>();
        let id = parse_id(&id)?;

        let record = db.meshis().get_by_id(id).await.map_err(internal_error)?;
        Ok(record.map(Meshi::from))
    }

    /// Meshis newest first, optionally filtered by a full-text query
    async fn meshis(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        query: Option<String>,
    ) -> Result<MeshiConnection> {
        let db = ctx.data_unchecked::<Database>();
        let request = PageRequest::new(first, after, query).map_err(|e| e.extend())?;

        let connection = paginate(&db.meshis(), &MESHI_LISTING, &request)
            .await
            .map_err(|e| e.extend())?;

        tracing::debug!(
            returned = connection.edges.len(),
            total = connection.total_count,
            has_next = connection.page_info.has_next_page,
            search = request.query().search_term().is_some(),
            "Listed meshis"
        );

        Ok(connection.into())
    }
}
