mod inventory;
mod proxy;
mod reconcile;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use stockmap_reconcile::Reconciler;
use stockmap_webhook::{DictionaryEndpoints, WebhookClient};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

/// Largest explicit `limit` a read endpoint accepts.
const MAX_LIMIT: i64 = 10_000;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub reconciler: Reconciler,
    pub webhook: WebhookClient,
    pub inventory_url: Url,
    pub dictionary: DictionaryEndpoints,
    pub default_operator: String,
    pub low_stock_threshold: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Body of the webhook proxy endpoints. Failures keep the UI's fetch from
/// throwing, so only validation and timeouts change the status code.
#[derive(Debug, Serialize)]
pub struct ProxyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip)]
    status: StatusCode,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

impl ProxyResponse {
    pub(super) fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: (!data.is_null()).then_some(data),
            status: StatusCode::OK,
        }
    }

    /// Request rejected before any upstream call.
    pub(super) fn invalid(message: impl Into<String>) -> Self {
        Self::failure(StatusCode::BAD_REQUEST, message)
    }

    pub(super) fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            status,
        }
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

/// Clamps an explicit `limit`; `None` means read every row.
pub(super) fn normalize_limit(limit: Option<i64>) -> Option<i64> {
    limit.map(|l| l.clamp(1, MAX_LIMIT))
}

pub(super) fn map_db_error(request_id: String, error: &stockmap_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Parses a `from`/`to` query bound. A bare date used as an upper bound
/// covers the whole day.
pub(super) fn parse_date_bound(
    request_id: &str,
    field: &str,
    raw: Option<&str>,
    end_of_day: bool,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if end_of_day {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
            return Ok(Some(date.and_time(last).and_utc()));
        }
    }
    stockmap_db::parse_timestamp_str(raw).map(Some).ok_or_else(|| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("{field} is not a valid date or timestamp: {raw}"),
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    let reads = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/inventory", get(inventory::list_inventory))
        .route(
            "/api/v1/inventory/summary",
            get(inventory::inventory_summary),
        )
        .route("/api/v1/movements", get(inventory::list_movements))
        .route("/api/v1/orders", get(inventory::list_orders));

    let reconciliation = Router::new()
        .route("/api/v1/unmapped", get(reconcile::list_unmapped))
        .route(
            "/api/v1/mappings",
            get(reconcile::list_mappings).post(reconcile::create_mapping),
        )
        .route(
            "/api/v1/combos",
            get(reconcile::list_combos).post(reconcile::create_combo),
        )
        .route("/api/v1/combos/{id}", delete(reconcile::delete_combo));

    let proxy = Router::new()
        .route("/api/inventory/mutate", post(proxy::mutate_inventory))
        .route("/api/dictionary/product", post(proxy::add_product_to_dictionary))
        .route("/api/dictionary/combo", post(proxy::add_combo_to_dictionary));

    Router::new()
        .merge(reads)
        .merge(reconciliation)
        .merge(proxy)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match stockmap_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests;
