//! Reads over the upstream inventory-movement table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::json_table::{read_json_rows, JsonTableRead};
use crate::DbError;

pub const MOVEMENTS_TABLE: &str = "movimientos_inventario";

/// Input filters for movement listing.
///
/// `product` and `store` are case-insensitive substring matches against the
/// row's `producto` and `tienda` fields. `from`/`to` are inclusive bounds on
/// the detected timestamp column.
#[derive(Debug, Clone, Default)]
pub struct MovementFilters<'a> {
    pub product: Option<&'a str>,
    pub store: Option<&'a str>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Lists movement rows as JSON objects, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_movements(
    pool: &PgPool,
    filters: MovementFilters<'_>,
    page_size: i64,
) -> Result<Vec<Value>, DbError> {
    read_json_rows(
        pool,
        JsonTableRead {
            table: MOVEMENTS_TABLE,
            contains: vec![("producto", filters.product), ("tienda", filters.store)],
            from: filters.from,
            to: filters.to,
            limit: filters.limit,
        },
        page_size,
    )
    .await
}
