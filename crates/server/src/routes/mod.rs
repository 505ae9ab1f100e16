//! HTTP route handlers for the server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database ping)
//!
//! # Checkout pipeline
//! POST /api/checkout            - Create a hosted checkout session
//! POST /api/webhooks/stripe     - Payment webhook (signature-verified)
//!
//! # Fulfillment
//! POST /api/printify/order      - Normalize and submit an order
//! GET  /api/printify/products   - Product catalog (cached pass-through)
//!
//! # Affiliate
//! POST /api/affiliate/click     - Record a referral click event
//! ```
//!
//! Each external interface has exactly one authoritative handler; field
//! coercion and validation are shared through [`crate::validate`] rather
//! than duplicated per route.

pub mod affiliate;
pub mod checkout;
pub mod order;
pub mod products;
pub mod webhook;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the checkout and webhook routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::create_session))
        .route("/webhooks/stripe", post(webhook::stripe_webhook))
}

/// Create the fulfillment routes router.
pub fn fulfillment_routes() -> Router<AppState> {
    Router::new()
        .route("/printify/order", post(order::create_order))
        .route("/printify/products", get(products::list))
}

/// Create the affiliate routes router.
pub fn affiliate_routes() -> Router<AppState> {
    Router::new().route("/affiliate/click", post(affiliate::record_click))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest(
            "/api",
            Router::new()
                .merge(checkout_routes())
                .merge(fulfillment_routes())
                .merge(affiliate_routes()),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
