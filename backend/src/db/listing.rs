//! SQL assembly for paginated listings
//!
//! Conditions are collected with positional `$n` placeholders and a parallel
//! list of bind values, so user input never ends up in the SQL text.

use anyhow::Result;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{FromRow, PgPool, Postgres};

use crate::pagination::{FetchPlan, ListingQuery, SqlPredicate, SqlValue};

/// PGroonga full-text match operator (query syntax).
const MATCH_OPERATOR: &str = "&@~";

/// WHERE/ORDER/LIMIT builder for one listing table.
#[derive(Debug, Clone)]
pub struct ListingSql {
    table: &'static str,
    conditions: Vec<String>,
    values: Vec<SqlValue>,
}

impl ListingSql {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Index of the next free `$n` placeholder.
    pub fn next_param(&self) -> usize {
        self.values.len() + 1
    }

    /// Add `column = $n`.
    pub fn filter_eq(mut self, column: &str, value: SqlValue) -> Self {
        self.conditions
            .push(format!("{} = ${}", column, self.next_param()));
        self.values.push(value);
        self
    }

    /// Add the full-text condition on `expression` when the query path is search.
    pub fn search(mut self, expression: &str, query: &ListingQuery) -> Self {
        if let Some(term) = query.search_term() {
            self.conditions.push(format!(
                "{} {} ${}",
                expression,
                MATCH_OPERATOR,
                self.next_param()
            ));
            self.values.push(SqlValue::Text(term.to_string()));
        }
        self
    }

    /// Add a prebuilt predicate whose placeholders start at [`Self::next_param`].
    pub fn and(mut self, predicate: SqlPredicate) -> Self {
        self.conditions.push(predicate.sql);
        self.values.extend(predicate.binds);
        self
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// `SELECT COUNT(*)` over the current conditions.
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}{}", self.table, self.where_clause())
    }

    /// Row query for a fetch plan: adds the after predicate, ordering and limit.
    pub fn fetch_sql(self, plan: &FetchPlan<'_>) -> (String, Vec<SqlValue>) {
        let mut sql = match plan
            .ordering
            .after_predicate(&plan.position, self.next_param())
        {
            Some(predicate) => self.and(predicate),
            None => self,
        };

        let limit_param = sql.next_param();
        sql.values.push(SqlValue::BigInt(plan.limit));

        let text = format!(
            "SELECT * FROM {}{} ORDER BY {} LIMIT ${}",
            sql.table,
            sql.where_clause(),
            plan.ordering.order_by_sql(),
            limit_param
        );
        (text, sql.values)
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

fn bind_query_as<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    values: &'q [SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::BigInt(i) => query.bind(*i),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Timestamp(t) => query.bind(*t),
        };
    }
    query
}

fn bind_query_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    values: &'q [SqlValue],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::BigInt(i) => query.bind(*i),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Timestamp(t) => query.bind(*t),
        };
    }
    query
}

/// Execute the count query built by [`ListingSql::count_sql`].
pub async fn count(pool: &PgPool, sql: &ListingSql) -> Result<i64> {
    let text = sql.count_sql();
    tracing::debug!(sql = %text, "Executing listing count");

    let count = bind_query_scalar(sqlx::query_scalar::<_, i64>(&text), sql.values())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Execute the row query for `plan`.
pub async fn fetch<R>(pool: &PgPool, sql: ListingSql, plan: &FetchPlan<'_>) -> Result<Vec<R>>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let (text, values) = sql.fetch_sql(plan);
    tracing::debug!(sql = %text, binds = values.len(), "Executing listing fetch");

    let rows = bind_query_as(sqlx::query_as::<_, R>(&text), &values)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
