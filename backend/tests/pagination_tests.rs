//! Integration tests for cursor pagination
//!
//! These tests drive the full listing flow (cursor decoding, ordering,
//! over-fetch, connection building) against an in-memory store that applies
//! the same ordering rules as the SQL store.

use std::sync::Mutex;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use meshi_backend::pagination::{
    Connection, FetchPlan, LIKE_CURSOR, LIKE_LISTING, ListableRecord, Listing, ListingQuery,
    ListingStore, MESHI_CURSOR, MESHI_LISTING, OrderingPolicy, PageRequest, PaginationError, Position, paginate,
};

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Clone)]
struct Row {
    id: i32,
    title: String,
    store_name: String,
    published: DateTime<Utc>,
}

impl ListableRecord for Row {
    fn id(&self) -> i32 {
        self.id
    }

    fn ordering_value(&self) -> DateTime<Utc> {
        self.published
    }
}

#[derive(Default)]
struct MemoryStore {
    rows: Vec<Row>,
    fail: bool,
    queries: Mutex<Vec<ListingQuery>>,
    plans: Mutex<Vec<(Position, i64)>>,
}

impl MemoryStore {
    fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn matches(&self, row: &Row, query: &ListingQuery) -> bool {
        match query.search_term() {
            None => true,
            Some(term) => format!("{} {}", row.title, row.store_name).contains(term),
        }
    }

    fn seen_queries(&self) -> Vec<ListingQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn seen_plans(&self) -> Vec<(Position, i64)> {
        self.plans.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    type Record = Row;

    async fn count(&self, query: &ListingQuery) -> anyhow::Result<i64> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.rows.iter().filter(|r| self.matches(r, query)).count() as i64)
    }

    async fn fetch(&self, plan: &FetchPlan<'_>) -> anyhow::Result<Vec<Row>> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        self.plans.lock().unwrap().push((plan.position, plan.limit));

        let mut rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|r| self.matches(r, plan.query))
            .filter(|r| plan.ordering.is_after(*r, &plan.position))
            .cloned()
            .collect();
        rows.sort_by(|a, b| plan.ordering.compare(a, b));
        rows.truncate(plan.limit as usize);
        Ok(rows)
    }

    async fn ordering_value_of(&self, id: i32) -> anyhow::Result<Option<DateTime<Utc>>> {
        Ok(self.rows.iter().find(|r| r.id == id).map(|r| r.published))
    }
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, d, 0, 0, 0).unwrap()
}

fn row(id: i32, published: DateTime<Utc>) -> Row {
    Row {
        id,
        title: format!("meshi {id}"),
        store_name: format!("store {id}"),
        published,
    }
}

fn three_days() -> MemoryStore {
    MemoryStore::new(vec![row(1, day(1)), row(2, day(2)), row(3, day(3))])
}

fn ids(conn: &Connection<Row>) -> Vec<i32> {
    conn.edges.iter().map(|e| e.node.id).collect()
}

async fn page(
    store: &MemoryStore,
    first: Option<i32>,
    after: Option<String>,
    query: Option<&str>,
) -> Result<Connection<Row>, PaginationError> {
    let request = PageRequest::new(first, after, query.map(str::to_string))?;
    paginate(store, &MESHI_LISTING, &request).await
}

// ============================================================================
// Walks
// ============================================================================

mod walks {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_first_page() {
        let store = three_days();
        let conn = page(&store, Some(2), None, None).await.unwrap();

        assert_eq!(ids(&conn), vec![3, 2]);
        assert!(conn.page_info.has_next_page);
        assert!(!conn.page_info.has_previous_page);
        assert_eq!(conn.total_count, 3);

        let end = conn.page_info.end_cursor.clone().unwrap();
        let decoded = MESHI_CURSOR.decode_composite(&end).unwrap();
        assert_eq!(decoded.id, 2);
        assert_eq!(decoded.ordering_value_ms, Some(day(2).timestamp_millis()));
        assert_eq!(conn.page_info.start_cursor, Some(conn.edges[0].cursor.clone()));
    }

    #[tokio::test]
    async fn test_continuation() {
        let store = three_days();
        let first = page(&store, Some(2), None, None).await.unwrap();
        let conn = page(&store, Some(2), first.page_info.end_cursor, None)
            .await
            .unwrap();

        assert_eq!(ids(&conn), vec![1]);
        assert!(!conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
        assert_eq!(conn.total_count, 3);
    }

    #[tokio::test]
    async fn test_tie_break_pagination() {
        let store = MemoryStore::new(vec![row(9, day(10)), row(10, day(10))]);

        let first = page(&store, Some(1), None, None).await.unwrap();
        assert_eq!(ids(&first), vec![10]);
        assert!(first.page_info.has_next_page);

        let second = page(&store, Some(1), first.page_info.end_cursor, None)
            .await
            .unwrap();
        assert_eq!(ids(&second), vec![9]);
        assert!(!second.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_full_walk_over_ties_has_no_gaps_or_repeats() {
        let store = MemoryStore::new(vec![row(8, day(5)), row(10, day(5)), row(9, day(5))]);

        let mut seen = Vec::new();
        let mut after = None;
        loop {
            let conn = page(&store, Some(1), after, None).await.unwrap();
            seen.extend(ids(&conn));
            if !conn.page_info.has_next_page {
                break;
            }
            after = conn.page_info.end_cursor;
        }

        assert_eq!(seen, vec![10, 9, 8]);
    }

    #[tokio::test]
    async fn test_walk_mixing_dates_and_ties() {
        let store = MemoryStore::new(vec![
            row(1, day(1)),
            row(2, day(3)),
            row(3, day(2)),
            row(4, day(3)),
            row(5, day(2)),
        ]);

        let mut seen = Vec::new();
        let mut after = None;
        loop {
            let conn = page(&store, Some(2), after, None).await.unwrap();
            assert!(conn.edges.len() <= 2);
            seen.extend(ids(&conn));
            if !conn.page_info.has_next_page {
                break;
            }
            after = conn.page_info.end_cursor;
        }

        assert_eq!(seen, vec![4, 2, 5, 3, 1]);
    }
}

// ============================================================================
// Page size and next-page detection
// ============================================================================

mod page_size {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_has_next_page_matches_remaining_rows() {
        for k in 0..6 {
            let rows = (1..=k).map(|id| row(id, day(1 + id as u32))).collect();
            let store = MemoryStore::new(rows);

            for n in 1..5 {
                let conn = page(&store, Some(n), None, None).await.unwrap();
                assert_eq!(conn.page_info.has_next_page, k > n, "k={k} n={n}");
                assert_eq!(conn.edges.len(), k.min(n) as usize, "k={k} n={n}");
            }
        }
    }

    #[tokio::test]
    async fn test_store_is_asked_for_one_extra_row() {
        let store = three_days();
        page(&store, Some(2), None, None).await.unwrap();
        page(&store, None, None, None).await.unwrap();
        page(&store, Some(5000), None, None).await.unwrap();

        let limits: Vec<i64> = store.seen_plans().into_iter().map(|(_, l)| l).collect();
        assert_eq!(limits, vec![3, 21, 1001]);
    }

    #[tokio::test]
    async fn test_empty_listing_is_a_successful_terminal_page() {
        let store = MemoryStore::new(Vec::new());
        let conn = page(&store, Some(3), None, None).await.unwrap();

        assert!(conn.edges.is_empty());
        assert!(!conn.page_info.has_next_page);
        assert_eq!(conn.page_info.start_cursor, None);
        assert_eq!(conn.page_info.end_cursor, None);
        assert_eq!(conn.total_count, 0);
    }

    #[tokio::test]
    async fn test_zero_page_size_is_rejected() {
        let store = three_days();
        let err = page(&store, Some(0), None, None).await.unwrap_err();

        assert_matches!(err, PaginationError::InvalidPageSize(0));
        assert!(store.seen_plans().is_empty());
    }
}

// ============================================================================
// Search path
// ============================================================================

mod search {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shops() -> MemoryStore {
        let mut rows = vec![row(1, day(1)), row(2, day(2)), row(3, day(3)), row(4, day(4))];
        rows[0].title = "Tonkotsu ramen".into();
        rows[2].store_name = "Ramen Ichiban".into();
        rows[3].title = "Miso ramen".into();
        MemoryStore::new(rows)
    }

    #[tokio::test]
    async fn test_empty_term_behaves_like_absent() {
        let store = shops();
        let absent = page(&store, Some(2), None, None).await.unwrap();
        let empty = page(&store, Some(2), None, Some("")).await.unwrap();
        let blank = page(&store, Some(2), None, Some("  ")).await.unwrap();

        assert_eq!(ids(&absent), ids(&empty));
        assert_eq!(ids(&absent), ids(&blank));
        assert_eq!(absent.total_count, empty.total_count);
        assert_eq!(absent.page_info, empty.page_info);
        assert!(store.seen_queries().iter().all(|q| *q == ListingQuery::Plain));
    }

    #[tokio::test]
    async fn test_total_count_covers_filtered_set_not_window() {
        let store = shops();
        let conn = page(&store, Some(1), None, Some("ramen")).await.unwrap();

        assert_eq!(ids(&conn), vec![4]);
        assert_eq!(conn.total_count, 2);
        assert!(conn.page_info.has_next_page);
        assert_eq!(
            store.seen_queries(),
            vec![ListingQuery::Search("ramen".into())]
        );

        let next = page(&store, Some(1), conn.page_info.end_cursor, Some("ramen"))
            .await
            .unwrap();
        assert_eq!(ids(&next), vec![1]);
        assert!(!next.page_info.has_next_page);
    }
}

// ============================================================================
// Cursors
// ============================================================================

mod cursors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_invalid_cursor_is_an_error_not_an_empty_page() {
        let store = three_days();

        for token in [
            "garbage!".to_string(),
            LIKE_CURSOR.encode_composite(day(2), 2),
            MESHI_CURSOR.encode_simple(2).replace('=', ""),
        ] {
            let err = page(&store, Some(2), Some(token.clone()), None)
                .await
                .unwrap_err();
            assert_matches!(err, PaginationError::InvalidCursor(_), "token {token}");
        }

        assert!(store.seen_plans().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_cursor_resolves_anchor_ordering_value() {
        let store = MemoryStore::new(vec![row(1, day(3)), row(2, day(1)), row(3, day(2))]);

        let conn = page(&store, Some(5), Some(MESHI_CURSOR.encode_simple(3)), None)
            .await
            .unwrap();

        assert_eq!(ids(&conn), vec![2]);
        assert_eq!(
            store.seen_plans()[0].0,
            Position::AfterKey {
                ordering_value: day(2),
                id: 3
            }
        );
    }

    #[tokio::test]
    async fn test_legacy_cursor_with_missing_anchor_falls_back_to_id() {
        let store = three_days();

        let conn = page(&store, Some(5), Some(MESHI_CURSOR.encode_simple(3)), None)
            .await
            .unwrap();

        assert_eq!(ids(&conn), vec![2, 1]);

        let gone = page(&store, Some(5), Some(MESHI_CURSOR.encode_simple(99)), None)
            .await
            .unwrap();
        assert_eq!(ids(&gone), vec![3, 2, 1]);
        assert_eq!(store.seen_plans()[1].0, Position::AfterId(99));
    }

    #[tokio::test]
    async fn test_id_ordered_listing_uses_simple_cursors() {
        const LEGACY: Listing = Listing {
            name: "legacy_meshis",
            codec: MESHI_CURSOR,
            ordering: OrderingPolicy::IdAscending,
        };
        let store = three_days();

        let request = PageRequest::new(Some(2), None, None).unwrap();
        let first = paginate(&store, &LEGACY, &request).await.unwrap();
        assert_eq!(ids(&first), vec![1, 2]);

        let end = first.page_info.end_cursor.unwrap();
        assert_eq!(MESHI_CURSOR.decode_simple(&end).unwrap(), 2);

        let request = PageRequest::new(Some(2), Some(end), None).unwrap();
        let second = paginate(&store, &LEGACY, &request).await.unwrap();
        assert_eq!(ids(&second), vec![3]);
        assert!(!second.page_info.has_next_page);

        let composite = MESHI_CURSOR.encode_composite(day(1), 1);
        let request = PageRequest::new(Some(2), Some(composite), None).unwrap();
        assert_matches!(
            paginate(&store, &LEGACY, &request).await,
            Err(PaginationError::InvalidCursor(_))
        );
    }
}

// ============================================================================
// Like listing
// ============================================================================

mod likes {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn like_page(
        store: &MemoryStore,
        first: i32,
        after: Option<String>,
    ) -> Result<Connection<Row>, PaginationError> {
        let request = PageRequest::new(Some(first), after, None)?;
        paginate(store, &LIKE_LISTING, &request).await
    }

    #[tokio::test]
    async fn test_walk_uses_like_cursors() {
        let store = MemoryStore::new(vec![row(1, day(1)), row(2, day(4)), row(3, day(4))]);

        let first = like_page(&store, 2, None).await.unwrap();
        assert_eq!(ids(&first), vec![3, 2]);
        assert!(first.page_info.has_next_page);

        let end = first.page_info.end_cursor.clone().unwrap();
        assert_eq!(
            LIKE_CURSOR.decode_composite(&end).unwrap().ordering_value_ms,
            Some(day(4).timestamp_millis())
        );
        assert_matches!(
            MESHI_CURSOR.decode_composite(&end),
            Err(PaginationError::InvalidCursor(_))
        );

        let second = like_page(&store, 2, Some(end)).await.unwrap();
        assert_eq!(ids(&second), vec![1]);
        assert!(!second.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_bare_like_id_cursor_resolves_anchor() {
        let store = MemoryStore::new(vec![
            row(40, day(1)),
            row(41, day(3)),
            row(42, day(2)),
            row(43, day(2)),
        ]);

        let conn = like_page(&store, 5, Some("42".to_string())).await.unwrap();

        assert_eq!(ids(&conn), vec![40]);
        assert!(conn.page_info.has_previous_page);
        assert_eq!(
            store.seen_plans()[0].0,
            Position::AfterKey {
                ordering_value: day(2),
                id: 42
            }
        );
    }

    #[tokio::test]
    async fn test_bare_like_id_cursor_with_missing_anchor_falls_back_to_id() {
        let store = MemoryStore::new(vec![row(1, day(1)), row(2, day(2))]);

        let conn = like_page(&store, 5, Some("2".to_string())).await.unwrap();
        assert_eq!(ids(&conn), vec![1]);

        let gone = like_page(&store, 5, Some("99".to_string())).await.unwrap();
        assert_eq!(ids(&gone), vec![2, 1]);
        assert_eq!(store.seen_plans()[1].0, Position::AfterId(99));
    }
}

// ============================================================================
// Data store failures
// ============================================================================

#[tokio::test]
async fn test_store_failure_propagates() {
    let store = MemoryStore::failing();
    let err = page(&store, Some(2), None, None).await.unwrap_err();

    assert_matches!(err, PaginationError::DataStore(_));
    assert!(err.to_string().contains("connection refused"));
}
