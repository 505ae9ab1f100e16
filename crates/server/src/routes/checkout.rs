//! Checkout session creation.
//!
//! Accepts the cart's line references, re-prices every line from the
//! server-side table (never from client input), and creates a hosted
//! checkout session with the cart snapshot embedded in metadata for the
//! webhook stage.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use shepherd_core::{CartSnapshot, LineItem, quantity_in_range};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::stripe::PricedLine;
use crate::validate::{coerce_quantity, coerce_string};

/// Display name shown on the hosted checkout page.
const PRODUCT_DISPLAY_NAME: &str = "Apparel";

/// Checkout request body.
///
/// Item fields are loose (`Value`) to tolerate numeric ids and string
/// quantities from different storefront callers.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Option<Vec<Value>>,
}

/// Checkout response: where to redirect the customer.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Create a hosted checkout session for the submitted cart.
#[instrument(skip(state, request))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let items = match request.items {
        Some(items) if !items.is_empty() => items,
        _ => return Err(AppError::BadRequest("No items provided".to_string())),
    };

    let mut lines = Vec::with_capacity(items.len());
    for item in &items {
        let obj = item
            .as_object()
            .ok_or_else(|| AppError::BadRequest("Invalid item format".to_string()))?;

        let product_id = obj.get("product_id").and_then(coerce_string);
        let variant_id = obj.get("variant_id").and_then(coerce_string);
        let (Some(product_id), Some(variant_id)) = (product_id, variant_id) else {
            return Err(AppError::BadRequest("Invalid item format".to_string()));
        };

        let quantity = obj
            .get("qty")
            .and_then(coerce_quantity)
            .ok_or_else(|| AppError::BadRequest("Invalid item format".to_string()))?;
        if !quantity_in_range(quantity) {
            return Err(AppError::BadRequest("Quantity out of range".to_string()));
        }

        // Authoritative server-side pricing; the client never names a price.
        let unit_amount = state.prices().unit_amount(&product_id, &variant_id);

        lines.push(PricedLine {
            item: LineItem::new(product_id, variant_id, quantity),
            unit_amount,
            product_name: PRODUCT_DISPLAY_NAME.to_string(),
        });
    }

    let cart = CartSnapshot(lines.iter().map(|l| l.item.clone()).collect());

    let base_url = &state.config().base_url;
    let success_url = format!("{base_url}/success?session_id={{CHECKOUT_SESSION_ID}}");
    let cancel_url = format!("{base_url}/cart");

    let session = state
        .stripe()
        .create_checkout_session(&lines, &cart, &success_url, &cancel_url)
        .await?;

    let url = session
        .url
        .ok_or_else(|| AppError::Internal("session missing redirect URL".to_string()))?;

    tracing::info!(session_id = %session.id, "checkout session created");

    Ok(Json(CheckoutResponse { url }))
}
