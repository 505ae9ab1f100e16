//! Direct order creation.
//!
//! The single authoritative order endpoint: every submission - whether from
//! the webhook dispatcher or an operator tool - goes through the same
//! normalizer before the gateway sees it.

use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::printify::{OrderRequest, normalize_order};
use crate::state::AppState;

/// Normalize and submit an order to the fulfillment provider.
///
/// Responds with `{ok, status, data}` on success; validation failures come
/// back as 400 with the itemized `missing` field list, and provider
/// rejections pass the provider's status and body through unchanged.
#[instrument(skip(state, body))]
pub async fn create_order(
    State(state): State<AppState>,
    body: std::result::Result<Json<OrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = body.map_err(|_| AppError::InvalidJson)?;

    let order = normalize_order(request, Utc::now(), &state.config().printify.default_label)?;

    let submission = state.printify().submit_order(&order).await?;

    tracing::info!(
        external_id = %order.external_id,
        send_to_production = order.send_to_production,
        "order submitted"
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "status": submission.status,
            "data": submission.data,
        })),
    ))
}
