//! Product catalog pass-through.

use axum::{Json, extract::State};
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// List the shop's products from the fulfillment provider.
///
/// Responses are cached in-process for 5 minutes; the catalog changes
/// rarely and the provider rate-limits aggressively.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>> {
    let products = state.printify().list_products().await?;
    Ok(Json(products))
}
