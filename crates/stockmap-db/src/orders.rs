//! Reads over the upstream order table, reduced to [`OrderRecord`]s.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use stockmap_core::OrderRecord;

use crate::json_table::{read_json_rows, JsonTableRead};
use crate::timestamps::{parse_timestamp, TIMESTAMP_CANDIDATES};
use crate::DbError;

pub const ORDERS_TABLE: &str = "pedidos";

const ID_KEYS: [&str; 3] = ["id", "numero_pedido", "order_id"];
const PRODUCT_KEYS: [&str; 2] = ["productos", "products"];
const STORE_KEYS: [&str; 2] = ["tienda", "store"];
const STATUS_KEYS: [&str; 2] = ["estado", "status"];
const PAYMENT_KEYS: [&str; 3] = ["metodo_pago", "payment_method", "forma_pago"];

/// Input filters for order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilters<'a> {
    pub store: Option<&'a str>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Lists orders newest first. Rows without an id or a readable timestamp
/// are skipped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_orders(
    pool: &PgPool,
    filters: OrderFilters<'_>,
    page_size: i64,
) -> Result<Vec<OrderRecord>, DbError> {
    let rows = read_json_rows(
        pool,
        JsonTableRead {
            table: ORDERS_TABLE,
            contains: vec![("tienda", filters.store)],
            from: filters.from,
            to: filters.to,
            limit: filters.limit,
        },
        page_size,
    )
    .await?;

    let total = rows.len();
    let orders: Vec<OrderRecord> = rows.iter().filter_map(order_from_row).collect();
    if orders.len() < total {
        tracing::warn!(skipped = total - orders.len(), "order rows without id or timestamp skipped");
    }
    Ok(orders)
}

/// Reads an [`OrderRecord`] out of a raw order row.
///
/// Field names are tried in Spanish and English. A product list stored as a
/// JSON array of strings is joined with `", "`.
#[must_use]
pub fn order_from_row(row: &Value) -> Option<OrderRecord> {
    let id = first_text(row, &ID_KEYS)?;
    let created_at = TIMESTAMP_CANDIDATES
        .into_iter()
        .find_map(|key| row.get(key).and_then(parse_timestamp))?;

    let products = PRODUCT_KEYS
        .into_iter()
        .find_map(|key| match row.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        })
        .unwrap_or_default();

    Some(OrderRecord {
        id,
        products,
        created_at,
        store: first_text(row, &STORE_KEYS),
        status: first_text(row, &STATUS_KEYS),
        payment_method: first_text(row, &PAYMENT_KEYS),
    })
}

/// First non-blank string or number under any of `keys`, as text.
fn first_text(row: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match row.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
