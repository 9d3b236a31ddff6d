//! Reads over the upstream `inventario` table.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;
use stockmap_core::InventoryProduct;

use crate::pagination::{contains_pattern, fetch_paginated};
use crate::DbError;

/// Input filters for inventory listing.
///
/// `store` and `name` are case-insensitive substring matches. `limit` is
/// `None` to read every row in pages.
#[derive(Debug, Clone, Default)]
pub struct InventoryFilters<'a> {
    pub store: Option<&'a str>,
    pub name: Option<&'a str>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct InventoryRow {
    name: String,
    quantity: Option<i64>,
    store: Option<String>,
    min_stock: Option<i64>,
    max_stock: Option<i64>,
}

/// Lists inventory rows ordered by product name.
///
/// Rows carry no stable key upstream; each product's `id` is its position in
/// this result.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_inventory(
    pool: &PgPool,
    filters: InventoryFilters<'_>,
    page_size: i64,
) -> Result<Vec<InventoryProduct>, DbError> {
    let store = contains_pattern(filters.store);
    let name = contains_pattern(filters.name);
    let (store, name) = (store.as_deref(), name.as_deref());

    let rows = fetch_paginated(filters.limit, page_size, move |offset, limit| {
        fetch_inventory_page(pool, store, name, offset, limit)
    })
    .await?;

    tracing::debug!(rows = rows.len(), "inventory read");
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| InventoryProduct {
            id: i64::try_from(index).unwrap_or(i64::MAX),
            name: row.name,
            quantity: row.quantity.unwrap_or(0),
            store: row.store.unwrap_or_default(),
            min_stock: row.min_stock,
            max_stock: row.max_stock,
        })
        .collect())
}

/// `producto` repeats across stores, so `tienda` and `ctid` keep the order
/// total between pages.
const INVENTORY_PAGE_SQL: &str = "SELECT \
     producto AS name, \
     cantidad::BIGINT AS quantity, \
     tienda AS store, \
     stock_minimo::BIGINT AS min_stock, \
     stock_maximo::BIGINT AS max_stock \
 FROM inventario \
 WHERE ($1::TEXT IS NULL OR tienda ILIKE $1) \
   AND ($2::TEXT IS NULL OR producto ILIKE $2) \
 ORDER BY producto ASC, tienda ASC, ctid ASC \
 LIMIT $3 OFFSET $4";

async fn fetch_inventory_page(
    pool: &PgPool,
    store: Option<&str>,
    name: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<Vec<InventoryRow>, DbError> {
    let rows = sqlx::query_as::<_, InventoryRow>(INVENTORY_PAGE_SQL)
        .bind(store)
        .bind(name)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Per-store rollup of an inventory read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub store: String,
    pub product_count: u64,
    pub total_units: i64,
    pub low_stock_count: u64,
}

/// Rolls `products` up per store, ordered by store name. Store names are
/// grouped after trimming and lowercasing; the first spelling seen is kept.
#[must_use]
pub fn summarize_inventory(products: &[InventoryProduct], low_stock_threshold: i64) -> Vec<StoreSummary> {
    let mut by_store: BTreeMap<String, StoreSummary> = BTreeMap::new();
    for product in products {
        let key = product.store.trim().to_lowercase();
        let entry = by_store.entry(key).or_insert_with(|| StoreSummary {
            store: product.store.trim().to_string(),
            product_count: 0,
            total_units: 0,
            low_stock_count: 0,
        });
        entry.product_count += 1;
        entry.total_units = entry.total_units.saturating_add(product.quantity);
        if product.is_low_stock(low_stock_threshold) {
            entry.low_stock_count += 1;
        }
    }
    by_store.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_pages_are_totally_ordered() {
        assert!(INVENTORY_PAGE_SQL.contains("ORDER BY producto ASC, tienda ASC, ctid ASC LIMIT $3 OFFSET $4"));
    }

    fn product(store: &str, quantity: i64) -> InventoryProduct {
        InventoryProduct {
            id: 0,
            name: "GEL".to_string(),
            quantity,
            store: store.to_string(),
            min_stock: None,
            max_stock: None,
        }
    }

    #[test]
    fn summary_groups_by_normalized_store() {
        let products = vec![
            product("Centro", 10),
            product(" centro ", 2),
            product("Norte", 1),
        ];
        let summary = summarize_inventory(&products, 5);
        assert_eq!(
            summary,
            vec![
                StoreSummary {
                    store: "Centro".to_string(),
                    product_count: 2,
                    total_units: 12,
                    low_stock_count: 1,
                },
                StoreSummary {
                    store: "Norte".to_string(),
                    product_count: 1,
                    total_units: 1,
                    low_stock_count: 1,
                },
            ]
        );
    }

    #[test]
    fn summary_of_nothing_is_empty() {
        assert!(summarize_inventory(&[], 5).is_empty());
    }
}
