//! Pass-through endpoints for the inventory and dictionary webhooks.
//!
//! Bodies are validated locally and forwarded as a single POST. Only a
//! rejected body (400) or an upstream timeout (504) changes the status;
//! every other failure is a 200 with `success: false`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use reqwest::Url;
use serde::Serialize;
use stockmap_core::MutationKind;
use stockmap_webhook::{
    ComboDictionaryRequest, MutationPayload, MutationRequest, ProductDictionaryRequest,
    WebhookError,
};

use crate::middleware::RequestId;

use super::{AppState, ProxyResponse};

/// POST /api/inventory/mutate: create, edit or delete an inventory row.
pub(super) async fn mutate_inventory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<MutationRequest>, JsonRejection>,
) -> ProxyResponse {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return ProxyResponse::invalid(rejection.body_text()),
    };
    let payload = match MutationPayload::from_request(request, &state.default_operator) {
        Ok(payload) => payload,
        Err(e) => return ProxyResponse::invalid(e.to_string()),
    };

    let kind = payload.kind();
    tracing::info!(
        request_id = %req_id.0,
        operation = kind.as_wire(),
        product = payload.product(),
        "forwarding inventory mutation"
    );

    forward(&state, &state.inventory_url, &payload, mutation_message(kind)).await
}

/// POST /api/dictionary/product: register a product name in the dictionary.
pub(super) async fn add_product_to_dictionary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ProductDictionaryRequest>, JsonRejection>,
) -> ProxyResponse {
    let request = match body.map(|Json(r)| r.validate()) {
        Ok(Ok(request)) => request,
        Ok(Err(e)) => return ProxyResponse::invalid(e.to_string()),
        Err(rejection) => return ProxyResponse::invalid(rejection.body_text()),
    };
    let Some(url) = state.dictionary.product.clone() else {
        return unconfigured("product dictionary");
    };

    tracing::info!(request_id = %req_id.0, product = %request.producto_existente, "forwarding dictionary product");
    forward(&state, &url, &request, "product added to dictionary").await
}

/// POST /api/dictionary/combo: register a combo and its members.
pub(super) async fn add_combo_to_dictionary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ComboDictionaryRequest>, JsonRejection>,
) -> ProxyResponse {
    let request = match body.map(|Json(r)| r.validate()) {
        Ok(Ok(request)) => request,
        Ok(Err(e)) => return ProxyResponse::invalid(e.to_string()),
        Err(rejection) => return ProxyResponse::invalid(rejection.body_text()),
    };
    let Some(url) = state.dictionary.combo.clone() else {
        return unconfigured("combo dictionary");
    };

    tracing::info!(
        request_id = %req_id.0,
        combo = %request.combo_existente,
        members = request.combo_nuevo.len(),
        "forwarding dictionary combo"
    );
    forward(&state, &url, &request, "combo added to dictionary").await
}

async fn forward<T: Serialize + Sync>(
    state: &AppState,
    url: &Url,
    body: &T,
    success_message: &str,
) -> ProxyResponse {
    match state.webhook.post_json(url, body).await {
        Ok(data) => ProxyResponse::ok(success_message, data),
        Err(e) => webhook_failure(&e),
    }
}

fn webhook_failure(error: &WebhookError) -> ProxyResponse {
    match error {
        WebhookError::Timeout { .. } => {
            tracing::warn!(error = %error, "webhook timed out");
            ProxyResponse::failure(StatusCode::GATEWAY_TIMEOUT, error.to_string())
        }
        WebhookError::Upstream { .. } => ProxyResponse::failure(StatusCode::OK, error.to_string()),
        WebhookError::Http(e) => {
            tracing::warn!(error = %e, "webhook unreachable");
            ProxyResponse::failure(StatusCode::OK, format!("could not reach webhook: {e}"))
        }
        WebhookError::InvalidUrl { .. } => {
            tracing::error!(error = %error, "webhook misconfigured");
            ProxyResponse::failure(StatusCode::OK, error.to_string())
        }
    }
}

fn unconfigured(what: &str) -> ProxyResponse {
    tracing::warn!(endpoint = what, "webhook URL not configured");
    ProxyResponse::failure(StatusCode::OK, format!("{what} webhook is not configured"))
}

fn mutation_message(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Create => "product created",
        MutationKind::Edit => "product updated",
        MutationKind::Delete => "product deleted",
    }
}
