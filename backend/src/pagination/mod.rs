//! Cursor-based pagination for listing queries
//!
//! A listing request flows through four stages:
//!
//! 1. [`cursor`] decodes the opaque `after` token.
//! 2. [`ordering`] maps the decoded position to a "strictly after" predicate
//!    and an ORDER BY clause.
//! 3. [`fetcher`] runs the count and the `first + 1` row fetch against a
//!    [`ListingStore`].
//! 4. [`connection`] trims the extra row and derives the page info.
//!
//! Rows inserted or deleted between two page requests may be skipped or
//! repeated; no snapshot spans a pagination walk.

pub mod connection;
pub mod cursor;
pub mod error;
pub mod fetcher;
pub mod ordering;

pub use connection::{Connection, Edge, PageInfo, build_connection, cursor_for};
pub use cursor::{CursorCodec, DecodedCursor, LIKE_CURSOR, MESHI_CURSOR};
pub use error::{PaginationError, PaginationResult};
pub use fetcher::{
    DEFAULT_PAGE_SIZE, FetchPlan, FetchedPage, LIKE_LISTING, Listing, ListingQuery, ListingStore,
    MAX_PAGE_SIZE, MESHI_LISTING, PageRequest, fetch_page, resolve_position,
};
pub use ordering::{ListableRecord, OrderingPolicy, Position, SqlPredicate, SqlValue};

/// Fetch and assemble one page of `listing` from `store`.
pub async fn paginate<S: ListingStore + ?Sized>(
    store: &S,
    listing: &Listing,
    request: &PageRequest,
) -> PaginationResult<Connection<S::Record>> {
    let fetched = fetch_page(store, listing, request).await?;
    Ok(build_connection(fetched, request, listing))
}
