//! Connection building: trims the over-fetched rows and derives page info.

use std::cmp::Ordering;

use async_graphql::SimpleObject;

use super::fetcher::{FetchedPage, Listing, PageRequest};
use super::ordering::{ListableRecord, OrderingPolicy};

/// Information about pagination in a connection
#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// When paginating forwards, are there more items?
    pub has_next_page: bool,
    /// True when the request carried an `after` cursor
    pub has_previous_page: bool,
    /// Cursor of the first item in this page
    pub start_cursor: Option<String>,
    /// Cursor of the last item in this page
    pub end_cursor: Option<String>,
}

/// An edge in a connection, containing a node and cursor (internal use)
#[derive(Debug, Clone)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: String,
}

/// A paginated connection result (internal use)
#[derive(Debug, Clone)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    /// Rows matching the filter, independent of the pagination window
    pub total_count: i64,
}

impl<T> Connection<T> {
    /// Convert every node, keeping cursors and page info.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Connection<U> {
        Connection {
            edges: self
                .edges
                .into_iter()
                .map(|e| Edge {
                    node: f(e.node),
                    cursor: e.cursor,
                })
                .collect(),
            page_info: self.page_info,
            total_count: self.total_count,
        }
    }
}

/// Encode the cursor for `record` in the listing's cursor family.
pub fn cursor_for<R: ListableRecord>(listing: &Listing, record: &R) -> String {
    if listing.ordering.is_timestamp_ordered() {
        listing
            .codec
            .encode_composite(record.ordering_value(), record.id())
    } else {
        listing.codec.encode_simple(record.id())
    }
}

/// Build the public page from an over-fetched result.
pub fn build_connection<R: ListableRecord>(
    fetched: FetchedPage<R>,
    request: &PageRequest,
    listing: &Listing,
) -> Connection<R> {
    let FetchedPage {
        mut rows,
        total_count,
    } = fetched;

    let first = usize::try_from(request.first()).unwrap_or(0);
    let has_next_page = rows.len() > first;
    rows.truncate(first);

    if !is_sorted(&listing.ordering, &rows) {
        tracing::warn!(
            listing = listing.name,
            "Store returned rows out of listing order"
        );
    }

    let edges: Vec<Edge<R>> = rows
        .into_iter()
        .map(|node| Edge {
            cursor: cursor_for(listing, &node),
            node,
        })
        .collect();

    let page_info = PageInfo {
        has_next_page,
        has_previous_page: request.after().is_some(),
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };

    Connection {
        edges,
        page_info,
        total_count,
    }
}

fn is_sorted<R: ListableRecord>(ordering: &OrderingPolicy, rows: &[R]) -> bool {
    rows.windows(2)
        .all(|pair| ordering.compare(&pair[0], &pair[1]) == Ordering::Less)
}
