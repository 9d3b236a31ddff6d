//! Unmapped order tokens and the mappings/combos that resolve them.
//!
//! Saves go through [`stockmap_reconcile::Reconciler`], which commits to the
//! local store before queueing the dictionary mirror. The store does
//! blocking file I/O, so every call runs on the blocking pool.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use stockmap_core::{ComboItem, ProductCombo, ProductMapping, UnmappedProductAggregate};
use stockmap_reconcile::{ComboDraft, ReconcileError, Reconciler};

use crate::middleware::RequestId;

use super::{map_db_error, parse_date_bound, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct UnmappedQuery {
    pub store: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateMappingRequest {
    #[serde(default)]
    pub unmapped_name: String,
    #[serde(default)]
    pub product_name: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ComboItemRequest {
    #[serde(default, alias = "productName")]
    pub product_name: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateComboRequest {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<ComboItemRequest>,
    /// When set, the unmapped token is also mapped onto the saved combo.
    pub unmapped_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ComboSaved {
    combo: ProductCombo,
    #[serde(skip_serializing_if = "Option::is_none")]
    mapping: Option<ProductMapping>,
}

#[derive(Debug, Serialize)]
pub(super) struct ComboDeleted {
    id: String,
    mappings_removed: usize,
}

impl CreateComboRequest {
    fn into_draft(self) -> (ComboDraft, Option<String>) {
        let draft = ComboDraft {
            id: self.id,
            name: self.name,
            items: self
                .items
                .into_iter()
                .map(|item| ComboItem {
                    product_name: item.product_name,
                    quantity: item.quantity,
                })
                .collect(),
        };
        (draft, self.unmapped_name)
    }
}

fn map_reconcile_error(request_id: &str, error: &ReconcileError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

async fn with_store<T, F>(state: &AppState, request_id: &str, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&Reconciler) -> T + Send + 'static,
    T: Send + 'static,
{
    let reconciler = state.reconciler.clone();
    tokio::task::spawn_blocking(move || call(&reconciler))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "mapping store task failed");
            ApiError::new(request_id, "internal_error", "mapping store task failed")
        })
}

pub(super) async fn list_unmapped(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<UnmappedQuery>,
) -> Result<Json<ApiResponse<Vec<UnmappedProductAggregate>>>, ApiError> {
    let from = parse_date_bound(&req_id.0, "from", query.from.as_deref(), false)?;
    let to = parse_date_bound(&req_id.0, "to", query.to.as_deref(), true)?;

    let orders = stockmap_db::list_orders(
        &state.pool,
        stockmap_db::OrderFilters {
            store: query.store.as_deref(),
            from,
            to,
            limit: None,
        },
        state.page_size,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let order_count = orders.len();
    let data = with_store(&state, &req_id.0, move |r| r.unmapped(&orders)).await?;
    tracing::debug!(orders = order_count, unmapped = data.len(), "unmapped aggregation");

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_mappings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductMapping>>>, ApiError> {
    let data = with_store(&state, &req_id.0, Reconciler::mappings).await?;
    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/mappings: map an unmapped token onto one inventory product.
pub(super) async fn create_mapping(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateMappingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductMapping>>), ApiError> {
    let mapping = with_store(&state, &req_id.0, move |r| {
        r.map_to_product(&body.unmapped_name, &body.product_name, body.quantity)
    })
    .await?
    .map_err(|e| map_reconcile_error(&req_id.0, &e))?;

    tracing::info!(
        unmapped = %mapping.unmapped_name,
        product = %mapping.mapped_product_name,
        "mapping saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: mapping,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn list_combos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductCombo>>>, ApiError> {
    let data = with_store(&state, &req_id.0, Reconciler::combos).await?;
    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/combos: save a combo, optionally mapping a token onto it.
pub(super) async fn create_combo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateComboRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ComboSaved>>), ApiError> {
    let (draft, unmapped_name) = body.into_draft();

    let saved = with_store(&state, &req_id.0, move |r| match unmapped_name {
        Some(unmapped) => r
            .map_to_combo(&unmapped, draft)
            .map(|(combo, mapping)| ComboSaved {
                combo,
                mapping: Some(mapping),
            }),
        None => r.save_combo(draft).map(|combo| ComboSaved {
            combo,
            mapping: None,
        }),
    })
    .await?
    .map_err(|e| map_reconcile_error(&req_id.0, &e))?;

    tracing::info!(combo_id = %saved.combo.id, mapped = saved.mapping.is_some(), "combo saved");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: saved,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// DELETE /api/v1/combos/{id}: remove a combo and the mappings onto it.
pub(super) async fn delete_combo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ComboDeleted>>, ApiError> {
    let combo_id = id.clone();
    let deletion = with_store(&state, &req_id.0, move |r| r.delete_combo(&combo_id)).await?;
    if deletion.is_noop() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("combo '{id}' not found"),
        ));
    }

    tracing::info!(combo_id = %id, mappings_removed = deletion.mappings_removed, "combo deleted");

    Ok(Json(ApiResponse {
        data: ComboDeleted {
            id,
            mappings_removed: deletion.mappings_removed,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
