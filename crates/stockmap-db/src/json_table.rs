//! Schema-agnostic reads that return whole rows as JSON objects.
//!
//! The movement and order tables differ between deployments, so their rows
//! are read with `to_jsonb` and the ordering column is picked from the
//! table's actual columns at query time.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::pagination::{contains_pattern, fetch_paginated};
use crate::timestamps::{is_timestamp_column, pick_order_column, sort_newest_first};
use crate::DbError;

pub(crate) struct JsonTableRead<'a> {
    pub table: &'static str,
    /// JSON key and optional substring filter, matched case-insensitively.
    pub contains: Vec<(&'static str, Option<&'a str>)>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Reads matching rows newest first.
///
/// Date bounds apply to the detected timestamp column; when the table has
/// none they are ignored with a warning.
pub(crate) async fn read_json_rows(
    pool: &PgPool,
    read: JsonTableRead<'_>,
    page_size: i64,
) -> Result<Vec<Value>, DbError> {
    let columns = table_columns(pool, read.table).await?;
    let order_column = pick_order_column(&columns);
    let timestamp_column = order_column.filter(|c| is_timestamp_column(c));

    let (from, to) = if timestamp_column.is_some() {
        (read.from, read.to)
    } else {
        if read.from.is_some() || read.to.is_some() {
            tracing::warn!(table = read.table, "no timestamp column; ignoring date range");
        }
        (None, None)
    };

    let keys: Vec<&str> = read.contains.iter().map(|(key, _)| *key).collect();
    let patterns: Vec<Option<String>> = read
        .contains
        .iter()
        .map(|(_, needle)| contains_pattern(*needle))
        .collect();
    let has_id = columns.iter().any(|c| c == "id");
    let sql = build_select(read.table, &keys, order_column, timestamp_column, has_id);

    let (sql, patterns) = (sql.as_str(), &patterns);
    let mut rows = fetch_paginated(read.limit, page_size, move |offset, limit| {
        let mut query = sqlx::query_scalar::<_, Value>(sql);
        for pattern in patterns {
            query = query.bind(pattern.clone());
        }
        let query = query.bind(from).bind(to).bind(limit).bind(offset);
        async move { query.fetch_all(pool).await.map_err(DbError::from) }
    })
    .await?;

    sort_newest_first(&mut rows);
    tracing::debug!(table = read.table, rows = rows.len(), order_column, "json rows read");
    Ok(rows)
}

async fn table_columns(pool: &PgPool, table: &str) -> Result<Vec<String>, DbError> {
    let columns = sqlx::query_scalar::<_, String>(
        "SELECT column_name::TEXT \
         FROM information_schema.columns \
         WHERE table_schema = current_schema() AND table_name = $1 \
         ORDER BY ordinal_position",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    Ok(columns)
}

/// Builds the page query. Parameters: one `ILIKE` pattern per key, then
/// `from`, `to`, `LIMIT`, `OFFSET`.
///
/// `table`, `keys` and the columns are compile-time names or members of
/// [`crate::TIMESTAMP_CANDIDATES`], never request input.
fn build_select(
    table: &str,
    keys: &[&str],
    order_column: Option<&str>,
    timestamp_column: Option<&str>,
    has_id: bool,
) -> String {
    let mut sql = format!("SELECT to_jsonb(t) FROM {table} t WHERE TRUE");
    let mut param = 0;
    for key in keys {
        param += 1;
        sql.push_str(&format!(
            " AND (${param}::TEXT IS NULL OR to_jsonb(t)->>'{key}' ILIKE ${param})"
        ));
    }

    let (from, to) = (param + 1, param + 2);
    match timestamp_column {
        Some(col) => sql.push_str(&format!(
            " AND (${from}::TIMESTAMPTZ IS NULL OR (to_jsonb(t)->>'{col}')::TIMESTAMPTZ >= ${from})\
             \x20AND (${to}::TIMESTAMPTZ IS NULL OR (to_jsonb(t)->>'{col}')::TIMESTAMPTZ <= ${to})"
        )),
        None => sql.push_str(&format!(
            " AND ${from}::TIMESTAMPTZ IS NULL AND ${to}::TIMESTAMPTZ IS NULL"
        )),
    }

    sql.push_str(&order_clause(order_column, has_id));
    sql.push_str(&format!(" LIMIT ${} OFFSET ${}", param + 3, param + 4));
    sql
}

/// Pages are separate queries, so the order must be total: rows tied on
/// the order column fall back to `id`, or to `ctid` when there is no `id`.
fn order_clause(order_column: Option<&str>, has_id: bool) -> String {
    let tie_break = if has_id { "t.\"id\" DESC" } else { "t.ctid DESC" };
    match order_column {
        Some("id") if has_id => " ORDER BY t.\"id\" DESC".to_string(),
        Some(col) => format!(" ORDER BY t.\"{col}\" DESC, {tie_break}"),
        None => format!(" ORDER BY {tie_break}"),
    }
}
