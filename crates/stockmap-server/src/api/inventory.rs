use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockmap_core::{InventoryProduct, OrderRecord};
use stockmap_db::StoreSummary;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, parse_date_bound, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct InventoryQuery {
    pub store: Option<String>,
    pub name: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MovementQuery {
    pub product: Option<String>,
    pub store: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrderQuery {
    pub store: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct InventoryItem {
    #[serde(flatten)]
    product: InventoryProduct,
    low_stock: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct OrderItem {
    id: String,
    products: String,
    created_at: DateTime<Utc>,
    store: Option<String>,
    status: Option<String>,
    status_label: Option<&'static str>,
    payment_method: Option<String>,
    payment_label: Option<&'static str>,
}

impl From<OrderRecord> for OrderItem {
    fn from(order: OrderRecord) -> Self {
        let status_label = order.status_kind().map(|s| s.label());
        let payment_label = order.payment_kind().map(|p| p.label());
        Self {
            id: order.id,
            products: order.products,
            created_at: order.created_at,
            store: order.store,
            status: order.status,
            status_label,
            payment_method: order.payment_method,
            payment_label,
        }
    }
}

pub(super) async fn list_inventory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<ApiResponse<Vec<InventoryItem>>>, ApiError> {
    let rows = stockmap_db::list_inventory(
        &state.pool,
        stockmap_db::InventoryFilters {
            store: query.store.as_deref(),
            name: query.name.as_deref(),
            limit: normalize_limit(query.limit),
        },
        state.page_size,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|product| InventoryItem {
            low_stock: product.is_low_stock(state.low_stock_threshold),
            product,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn inventory_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<StoreSummary>>>, ApiError> {
    let rows = stockmap_db::list_inventory(
        &state.pool,
        stockmap_db::InventoryFilters::default(),
        state.page_size,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: stockmap_db::summarize_inventory(&rows, state.low_stock_threshold),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_movements(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MovementQuery>,
) -> Result<Json<ApiResponse<Vec<Value>>>, ApiError> {
    let from = parse_date_bound(&req_id.0, "from", query.from.as_deref(), false)?;
    let to = parse_date_bound(&req_id.0, "to", query.to.as_deref(), true)?;

    let data = stockmap_db::list_movements(
        &state.pool,
        stockmap_db::MovementFilters {
            product: query.product.as_deref(),
            store: query.store.as_deref(),
            from,
            to,
            limit: normalize_limit(query.limit),
        },
        state.page_size,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<ApiResponse<Vec<OrderItem>>>, ApiError> {
    let from = parse_date_bound(&req_id.0, "from", query.from.as_deref(), false)?;
    let to = parse_date_bound(&req_id.0, "to", query.to.as_deref(), true)?;

    let rows = stockmap_db::list_orders(
        &state.pool,
        stockmap_db::OrderFilters {
            store: query.store.as_deref(),
            from,
            to,
            limit: normalize_limit(query.limit),
        },
        state.page_size,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(OrderItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
