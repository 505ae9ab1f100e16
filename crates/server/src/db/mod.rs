//! Database operations for the server's `PostgreSQL` instance.
//!
//! Checkout and fulfillment state lives with the providers (Stripe sessions,
//! Printify orders); the local database stores only what this service owns:
//!
//! ## Tables
//!
//! - `affiliate_clicks` - Immutable referral click events
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via
//! `sqlx migrate run`.

pub mod affiliate;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
