//! Printify fulfillment gateway.
//!
//! # Architecture
//!
//! - `reqwest` REST client with bearer-token auth in default headers
//! - One outbound order-creation call per [`PrintifyClient::submit_order`]
//!   invocation; at-most-once semantics are the caller's job (see
//!   [`crate::idempotency`])
//! - Product catalog responses cached in-memory via `moka` (5 minute TTL)
//!
//! All provider-side failures degrade to a structured [`PrintifyError`];
//! nothing in this module panics or leaks a raw transport error to a
//! request handler.

pub mod normalize;
pub mod types;

pub use normalize::{OrderValidationError, normalize_order};
pub use types::{Order, OrderRequest, OrderSubmission};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::PrintifyConfig;

/// Errors that can occur when interacting with the Printify API.
#[derive(Debug, Error)]
pub enum PrintifyError {
    /// HTTP transport failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the request; status and body preserved for diagnosis.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Client construction failed (malformed credential).
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl PrintifyError {
    /// The provider's HTTP status, when one was received.
    #[must_use]
    pub const fn provider_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the Printify REST API.
///
/// Cheaply cloneable; holds the HTTP client, shop binding, and the product
/// catalog cache behind an `Arc`.
#[derive(Clone)]
pub struct PrintifyClient {
    inner: Arc<PrintifyClientInner>,
}

struct PrintifyClientInner {
    client: reqwest::Client,
    api_base: String,
    shop_id: String,
    product_cache: Cache<String, Value>,
}

impl PrintifyClient {
    /// Create a new Printify API client.
    ///
    /// # Errors
    ///
    /// Returns [`PrintifyError::Configuration`] if the token cannot be used
    /// as a header value.
    pub fn new(config: &PrintifyConfig) -> Result<Self, PrintifyError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_token.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| PrintifyError::Configuration(format!("invalid API token: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let product_cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(PrintifyClientInner {
                client,
                api_base: config.api_base.trim_end_matches('/').to_string(),
                shop_id: config.shop_id.clone(),
                product_cache,
            }),
        })
    }

    /// Submit one normalized order to the provider.
    ///
    /// Exactly one outbound call per invocation. The provider deduplicates
    /// on `external_id`, but callers must still not invoke this twice for
    /// the same logical order.
    ///
    /// # Errors
    ///
    /// - [`PrintifyError::Api`] when the provider returns 4xx/5xx; the
    ///   provider's status and body are preserved
    /// - [`PrintifyError::Http`] on transport failure
    #[instrument(skip(self, order), fields(external_id = %order.external_id))]
    pub async fn submit_order(&self, order: &Order) -> Result<OrderSubmission, PrintifyError> {
        let url = format!(
            "{}/v1/shops/{}/orders.json",
            self.inner.api_base, self.inner.shop_id
        );

        let response = self.inner.client.post(&url).json(order).send().await?;
        let status = response.status();

        // Provider error bodies are JSON when the API rejects an order, but
        // can be plain text from intermediaries; keep whatever we got.
        let body: Option<Value> = response.json().await.ok();

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(|b| b.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("Printify order request failed")
                .to_string();
            return Err(PrintifyError::Api {
                status: status.as_u16(),
                message,
                body,
            });
        }

        debug!(status = status.as_u16(), "order submitted");

        Ok(OrderSubmission {
            status: status.as_u16(),
            data: body.unwrap_or(Value::Null),
        })
    }

    /// Fetch the shop's product catalog, cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns [`PrintifyError`] if the provider call fails and no cached
    /// value exists.
    pub async fn list_products(&self) -> Result<Value, PrintifyError> {
        let cache_key = format!("products:{}", self.inner.shop_id);

        if let Some(cached) = self.inner.product_cache.get(&cache_key).await {
            debug!("product catalog cache hit");
            return Ok(cached);
        }

        let url = format!(
            "{}/v1/shops/{}/products.json",
            self.inner.api_base, self.inner.shop_id
        );

        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PrintifyError::Api {
                status: status.as_u16(),
                message,
                body: None,
            });
        }

        let products: Value = response.json().await?;
        self.inner
            .product_cache
            .insert(cache_key, products.clone())
            .await;

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_status_preserved() {
        let err = PrintifyError::Api {
            status: 422,
            message: "variant unavailable".to_string(),
            body: None,
        };
        assert_eq!(err.provider_status(), Some(422));
        assert_eq!(err.to_string(), "API error: 422 - variant unavailable");
    }

    #[test]
    fn test_transport_error_has_no_provider_status() {
        let err = PrintifyError::Configuration("bad token".to_string());
        assert_eq!(err.provider_status(), None);
    }
}
