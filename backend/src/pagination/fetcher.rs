//! Page fetching: cursor resolution, query path selection and the one-row over-fetch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::cursor::{CursorCodec, LIKE_CURSOR, MESHI_CURSOR};
use super::error::{PaginationError, PaginationResult};
use super::ordering::{ListableRecord, OrderingPolicy, Position};

/// Page size used when the client does not send `first`.
pub const DEFAULT_PAGE_SIZE: i32 = 20;

/// Largest page a client may request; larger values are clamped.
pub const MAX_PAGE_SIZE: i32 = 1000;

/// Static description of a paginated listing: its cursor family and its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub name: &'static str,
    pub codec: CursorCodec,
    pub ordering: OrderingPolicy,
}

/// Restaurant feed, newest publication first.
pub const MESHI_LISTING: Listing = Listing {
    name: "meshis",
    codec: MESHI_CURSOR,
    ordering: OrderingPolicy::NewestFirst {
        column: "published_date",
    },
};

/// A user's likes, most recent first.
pub const LIKE_LISTING: Listing = Listing {
    name: "likes",
    codec: LIKE_CURSOR,
    ordering: OrderingPolicy::NewestFirst {
        column: "created_at",
    },
};

/// Query path, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingQuery {
    /// No text filter.
    Plain,
    /// Full-text search over the listing's searchable text.
    Search(String),
}

impl ListingQuery {
    /// Blank and missing search terms both select the plain path.
    pub fn from_term(term: Option<String>) -> Self {
        match term {
            Some(term) if !term.trim().is_empty() => Self::Search(term),
            _ => Self::Plain,
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        match self {
            Self::Plain => None,
            Self::Search(term) => Some(term),
        }
    }
}

/// Validated listing arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    first: i32,
    after: Option<String>,
    query: ListingQuery,
}

impl PageRequest {
    /// Validate raw `first`/`after`/`query` arguments.
    ///
    /// `first` defaults to [`DEFAULT_PAGE_SIZE`], is clamped to [`MAX_PAGE_SIZE`]
    /// and rejected when below 1. An empty `after` is treated as absent.
    pub fn new(
        first: Option<i32>,
        after: Option<String>,
        query: Option<String>,
    ) -> PaginationResult<Self> {
        let first = first.unwrap_or(DEFAULT_PAGE_SIZE);
        if first < 1 {
            return Err(PaginationError::InvalidPageSize(first));
        }

        Ok(Self {
            first: first.min(MAX_PAGE_SIZE),
            after: after.filter(|cursor| !cursor.is_empty()),
            query: ListingQuery::from_term(query),
        })
    }

    pub fn first(&self) -> i32 {
        self.first
    }

    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    pub fn query(&self) -> &ListingQuery {
        &self.query
    }
}

/// Everything a store needs to run the row fetch.
#[derive(Debug, Clone)]
pub struct FetchPlan<'a> {
    pub query: &'a ListingQuery,
    pub ordering: OrderingPolicy,
    pub position: Position,
    /// Rows to request: the page size plus one.
    pub limit: i64,
}

/// Data store behind a paginated listing.
#[async_trait]
pub trait ListingStore: Send + Sync {
    type Record: ListableRecord + Send;

    /// Count all rows matching the query path, ignoring the pagination window.
    async fn count(&self, query: &ListingQuery) -> anyhow::Result<i64>;

    /// Fetch rows matching the plan, sorted by the plan's ordering.
    async fn fetch(&self, plan: &FetchPlan<'_>) -> anyhow::Result<Vec<Self::Record>>;

    /// Ordering value of the record with `id`, used to place legacy id-only cursors.
    async fn ordering_value_of(&self, id: i32) -> anyhow::Result<Option<DateTime<Utc>>>;
}

/// Raw result of a fetch: up to `first + 1` rows and the filtered total.
#[derive(Debug, Clone)]
pub struct FetchedPage<R> {
    pub rows: Vec<R>,
    pub total_count: i64,
}

/// Turn the request's `after` token into a position under the listing's order.
pub async fn resolve_position<S: ListingStore + ?Sized>(
    store: &S,
    listing: &Listing,
    after: Option<&str>,
) -> PaginationResult<Position> {
    let Some(token) = after else {
        return Ok(Position::Start);
    };

    if !listing.ordering.is_timestamp_ordered() {
        return Ok(Position::AfterId(listing.codec.decode_simple(token)?));
    }

    let decoded = listing.codec.decode_composite(token)?;
    if let Some(ms) = decoded.ordering_value_ms {
        let ordering_value = DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| PaginationError::invalid_cursor("cursor timestamp out of range"))?;
        return Ok(Position::AfterKey {
            ordering_value,
            id: decoded.id,
        });
    }

    match store.ordering_value_of(decoded.id).await? {
        Some(ordering_value) => Ok(Position::AfterKey {
            ordering_value,
            id: decoded.id,
        }),
        None => {
            tracing::warn!(
                listing = listing.name,
                id = decoded.id,
                "Legacy cursor anchor no longer exists, falling back to id ordering"
            );
            Ok(Position::AfterId(decoded.id))
        }
    }
}

/// Run the count and the over-fetching row query for one page.
pub async fn fetch_page<S: ListingStore + ?Sized>(
    store: &S,
    listing: &Listing,
    request: &PageRequest,
) -> PaginationResult<FetchedPage<S::Record>> {
    let position = resolve_position(store, listing, request.after()).await?;
    let plan = FetchPlan {
        query: request.query(),
        ordering: listing.ordering,
        position,
        limit: i64::from(request.first()) + 1,
    };

    tracing::debug!(
        listing = listing.name,
        first = request.first(),
        search = request.query().search_term().is_some(),
        position = ?plan.position,
        "Fetching page"
    );

    let (total_count, rows) = tokio::try_join!(store.count(request.query()), store.fetch(&plan))?;

    Ok(FetchedPage { rows, total_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_page_size_defaults() {
        let request = PageRequest::new(None, None, None).unwrap();
        assert_eq!(request.first(), 20);
        assert_eq!(request.after(), None);
        assert_eq!(request.query(), &ListingQuery::Plain);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let request = PageRequest::new(Some(5000), None, None).unwrap();
        assert_eq!(request.first(), 1000);
        let request = PageRequest::new(Some(1000), None, None).unwrap();
        assert_eq!(request.first(), 1000);
    }

    #[test]
    fn test_non_positive_page_size_is_rejected() {
        assert_matches!(
            PageRequest::new(Some(0), None, None),
            Err(PaginationError::InvalidPageSize(0))
        );
        assert_matches!(
            PageRequest::new(Some(-5), None, None),
            Err(PaginationError::InvalidPageSize(-5))
        );
    }

    #[test]
    fn test_blank_search_term_selects_plain_path() {
        for term in [None, Some(String::new()), Some("   ".to_string())] {
            let request = PageRequest::new(Some(2), None, term).unwrap();
            assert_eq!(request.query(), &ListingQuery::Plain);
        }
        let request = PageRequest::new(Some(2), None, Some("ramen".into())).unwrap();
        assert_eq!(request.query().search_term(), Some("ramen"));
    }

    #[test]
    fn test_empty_after_is_absent() {
        let request = PageRequest::new(None, Some(String::new()), None).unwrap();
        assert_eq!(request.after(), None);
    }
}
