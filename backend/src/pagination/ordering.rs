//! Canonical listing order and the "strictly after the cursor" predicate.
//!
//! The SQL produced here and the in-memory comparison in [`OrderingPolicy::compare`]
//! describe the same total order; the connection builder relies on that when it
//! checks that a page is sorted.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// A record that can appear in a paginated connection.
pub trait ListableRecord {
    /// Store-assigned unique id, used as the tie-break.
    fn id(&self) -> i32;

    /// Primary sort key for timestamp-ordered listings.
    fn ordering_value(&self) -> DateTime<Utc>;
}

/// Total order of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// `id ASC`, paired with simple cursors.
    IdAscending,
    /// `<column> DESC, id DESC`, paired with composite cursors.
    NewestFirst { column: &'static str },
}

/// Where the next page starts, after cursor resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// No cursor: first page.
    Start,
    /// Only the id of the last seen record is known.
    AfterId(i32),
    /// Full sort key of the last seen record.
    AfterKey {
        ordering_value: DateTime<Utc>,
        id: i32,
    },
}

/// A value bound to a positional SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i32),
    BigInt(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// WHERE fragment using `$n` placeholders, with its bind values in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlPredicate {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

impl OrderingPolicy {
    /// Whether cursors for this order must carry the ordering value.
    pub fn is_timestamp_ordered(&self) -> bool {
        matches!(self, Self::NewestFirst { .. })
    }

    /// ORDER BY clause body (without the keywords).
    pub fn order_by_sql(&self) -> String {
        match self {
            Self::IdAscending => "id ASC".to_string(),
            Self::NewestFirst { column } => format!("{column} DESC, id DESC"),
        }
    }

    /// Predicate selecting every row that sorts strictly after `position`.
    ///
    /// `first_param` is the index of the first free `$n` placeholder.
    pub fn after_predicate(&self, position: &Position, first_param: usize) -> Option<SqlPredicate> {
        let p = first_param;
        match (self, position) {
            (_, Position::Start) => None,
            (Self::IdAscending, Position::AfterId(id))
            | (Self::IdAscending, Position::AfterKey { id, .. }) => Some(SqlPredicate {
                sql: format!("id > ${p}"),
                binds: vec![SqlValue::Int(*id)],
            }),
            // Best effort: ids are assigned in insertion order, which only
            // approximates the timestamp order.
            (Self::NewestFirst { .. }, Position::AfterId(id)) => Some(SqlPredicate {
                sql: format!("id < ${p}"),
                binds: vec![SqlValue::Int(*id)],
            }),
            // Exact only while `column` is stored at millisecond precision,
            // since composite cursors carry epoch milliseconds.
            (Self::NewestFirst { column }, Position::AfterKey { ordering_value, id }) => {
                Some(SqlPredicate {
                    sql: format!(
                        "({column} < ${p} OR ({column} = ${p} AND id < ${}))",
                        p + 1
                    ),
                    binds: vec![SqlValue::Timestamp(*ordering_value), SqlValue::Int(*id)],
                })
            }
        }
    }

    /// Compare two records under this order. `Less` means `a` is listed first.
    pub fn compare<R: ListableRecord>(&self, a: &R, b: &R) -> Ordering {
        match self {
            Self::IdAscending => a.id().cmp(&b.id()),
            Self::NewestFirst { .. } => b
                .ordering_value()
                .cmp(&a.ordering_value())
                .then_with(|| b.id().cmp(&a.id())),
        }
    }

    /// In-memory counterpart of [`Self::after_predicate`].
    pub fn is_after<R: ListableRecord>(&self, record: &R, position: &Position) -> bool {
        match (self, position) {
            (_, Position::Start) => true,
            (Self::IdAscending, Position::AfterId(id))
            | (Self::IdAscending, Position::AfterKey { id, .. }) => record.id() > *id,
            (Self::NewestFirst { .. }, Position::AfterId(id)) => record.id() < *id,
            (Self::NewestFirst { .. }, Position::AfterKey { ordering_value, id }) => {
                let ts = record.ordering_value();
                ts < *ordering_value || (ts == *ordering_value && record.id() < *id)
            }
        }
    }
}
