//! Payment webhook verification and order dispatch.
//!
//! The flow is a strict three-stage gate:
//!
//! 1. **Unverified -> Verified**: raw body + `stripe-signature` header are
//!    checked against the signing secret. Failure is a hard 400; unverified
//!    events are never trusted regardless of content.
//! 2. **Verified -> Filtered**: only `checkout.session.completed` proceeds.
//!    Everything else is acknowledged (Stripe retries on non-2xx and there
//!    is no work to do).
//! 3. **Filtered -> Dispatched**: the session's own `payment_status` is
//!    re-checked, the idempotency claim is taken *before* dispatch, and the
//!    order is submitted with `send_to_production: false` - drafts are
//!    promoted manually in the provider dashboard.
//!
//! Responses are bare text; Stripe does not read a body, only the status.
//! A 500 anywhere triggers Stripe's retry policy, and the already-taken
//! claim keeps a retried-but-dispatched event from double-submitting.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

use shepherd_core::CartSnapshot;

use crate::printify::{OrderRequest, normalize_order};
use crate::state::AppState;
use crate::stripe::types::{CHECKOUT_COMPLETED, CheckoutSessionObject, CustomerDetails};
use crate::stripe::webhook::construct_event;

/// Handle one payment webhook delivery.
#[instrument(skip_all)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|h| h.to_str().ok())
    else {
        return (StatusCode::BAD_REQUEST, "Missing stripe-signature").into_response();
    };

    let stripe_config = &state.config().stripe;
    let event = match construct_event(
        &body,
        signature,
        stripe_config.webhook_secret.expose_secret(),
        stripe_config.webhook_tolerance_secs,
        Utc::now().timestamp(),
    ) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "webhook signature verification failed");
            return (StatusCode::BAD_REQUEST, "Invalid signature").into_response();
        }
    };

    // Only act on successful checkout completion.
    if event.event_type != CHECKOUT_COMPLETED {
        return (StatusCode::OK, "Ignored").into_response();
    }

    let session: CheckoutSessionObject = match serde_json::from_value(event.data.object) {
        Ok(session) => session,
        Err(err) => {
            error!(event_id = %event.id, error = %err, "malformed checkout session object");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Webhook error").into_response();
        }
    };

    // Defense in depth: the event type says completed, but the session's
    // own payment flag is authoritative.
    if !session.is_paid() {
        return (StatusCode::OK, "Not paid").into_response();
    }

    // Claim before dispatch; a concurrent redelivery loses the claim and
    // acknowledges without re-dispatching.
    if !state.guard().claim(&session.id) {
        info!(session_id = %session.id, "duplicate webhook delivery");
        return (StatusCode::OK, "Already processed").into_response();
    }

    match dispatch_fulfillment(&state, &session).await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(err) => {
            error!(session_id = %session.id, error = %err, "fulfillment dispatch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Webhook error").into_response()
        }
    }
}

/// Build and submit the fulfillment order for a paid session.
///
/// The cart comes from session metadata (written at checkout); the shipping
/// address comes from the provider's own collected customer details - the
/// client-side address is never re-trusted. Runs through the same
/// normalizer as the direct order endpoint.
async fn dispatch_fulfillment(
    state: &AppState,
    session: &CheckoutSessionObject,
) -> Result<(), DispatchError> {
    let cart_raw = session
        .metadata
        .get("cart")
        .ok_or(DispatchError::MissingCart)?;
    let cart = CartSnapshot::from_metadata_json(cart_raw).map_err(DispatchError::InvalidCart)?;
    if cart.is_empty() {
        return Err(DispatchError::MissingCart);
    }

    let address = session
        .customer_details
        .as_ref()
        .map(CustomerDetails::shipping_address)
        .unwrap_or_default();

    let request = OrderRequest {
        line_items: Some(json!(cart.items())),
        address_to: Some(serde_json::to_value(address).map_err(DispatchError::InvalidCart)?),
        external_id: Some(Value::String(session.id.as_str().to_string())),
        label: None,
        // Safe launch mode: drafts only, promoted manually.
        send_to_production: Some(Value::Bool(false)),
    };

    let order = normalize_order(
        request,
        Utc::now(),
        &state.config().printify.default_label,
    )?;

    let submission = state.printify().submit_order(&order).await?;

    info!(
        session_id = %session.id,
        status = submission.status,
        "fulfillment order submitted"
    );

    Ok(())
}

/// Internal dispatch failure; always surfaces as a 500 to the provider.
#[derive(Debug, thiserror::Error)]
enum DispatchError {
    #[error("missing cart metadata")]
    MissingCart,
    #[error("invalid cart metadata JSON: {0}")]
    InvalidCart(serde_json::Error),
    #[error(transparent)]
    Validation(#[from] crate::printify::OrderValidationError),
    #[error(transparent)]
    Printify(#[from] crate::printify::PrintifyError),
}
