//! Shepherd Commerce server library.
//!
//! This crate provides the service functionality as a library, allowing it
//! to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod idempotency;
pub mod middleware;
pub mod pricing;
pub mod printify;
pub mod routes;
pub mod state;
pub mod stripe;
pub mod validate;

use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application router, including health endpoints and
/// cross-cutting middleware. Shared between `main` and the integration tests
/// so both exercise the same composition.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
