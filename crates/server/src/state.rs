//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::idempotency::IdempotencyGuard;
use crate::pricing::{PriceTable, PricingError};
use crate::printify::{PrintifyClient, PrintifyError};
use crate::stripe::{StripeClient, StripeError};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("stripe client: {0}")]
    Stripe(#[from] StripeError),
    #[error("printify client: {0}")]
    Printify(#[from] PrintifyError),
    #[error("price table: {0}")]
    Pricing(#[from] PricingError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds configuration, provider clients, the
/// price table, the idempotency guard, and the database pool.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    stripe: StripeClient,
    printify: PrintifyClient,
    prices: PriceTable,
    guard: IdempotencyGuard,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider client cannot be constructed or the
    /// configured price table is invalid.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StateError> {
        let stripe = StripeClient::new(&config.stripe)?;
        let printify = PrintifyClient::new(&config.printify)?;
        let prices = PriceTable::from_config(&config.pricing)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stripe,
                printify,
                prices,
                guard: IdempotencyGuard::new(),
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Stripe client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Get a reference to the Printify fulfillment gateway.
    #[must_use]
    pub fn printify(&self) -> &PrintifyClient {
        &self.inner.printify
    }

    /// Get a reference to the authoritative price table.
    #[must_use]
    pub fn prices(&self) -> &PriceTable {
        &self.inner.prices
    }

    /// Get a reference to the webhook idempotency guard.
    #[must_use]
    pub fn guard(&self) -> &IdempotencyGuard {
        &self.inner.guard
    }
}
