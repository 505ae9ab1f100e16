//! Stripe Checkout client and webhook verification.
//!
//! # Architecture
//!
//! - Sessions are created over Stripe's form-encoded REST API with `reqwest`
//!   directly; no SDK dependency
//! - Pricing is attached server-side per line - the client's idea of a price
//!   never reaches this module
//! - The cart snapshot rides along in session metadata; it is the only state
//!   connecting checkout to the webhook that fires after payment
//! - Webhook signatures are verified in [`webhook`]

pub mod types;
pub mod webhook;

pub use types::{CHECKOUT_COMPLETED, CheckoutSession, CheckoutSessionObject, CustomerDetails, Event};
pub use webhook::{SignatureError, WebhookError, construct_event, verify_signature};

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use shepherd_core::{CartSnapshot, CurrencyCode, LineItem, UnitAmount};

use crate::config::StripeConfig;

/// Provenance tag recorded in session metadata.
const CREATED_FROM: &str = "checkout_api";

/// Countries the hosted checkout collects shipping addresses for.
const ALLOWED_SHIPPING_COUNTRIES: [&str; 1] = ["US"];

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Session was created but carries no redirect URL.
    #[error("created session has no redirect URL")]
    MissingRedirectUrl,

    /// Client construction failed (malformed credential).
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// One checkout line with its authoritative server-side price.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub item: LineItem,
    pub unit_amount: UnitAmount,
    /// Display name shown on the hosted checkout page.
    pub product_name: String,
}

/// Client for the Stripe Checkout Sessions API.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    api_base: String,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Configuration`] if the secret key cannot be
    /// used as a header value.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StripeError::Configuration(format!("invalid secret key: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(StripeClientInner {
                client,
                api_base: config.api_base.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Create a hosted checkout session.
    ///
    /// The session embeds the cart snapshot in its metadata; the returned
    /// session's `url` is where the caller redirects the customer. No money
    /// moves and no order is created by this call.
    ///
    /// # Errors
    ///
    /// - [`StripeError::Api`] when Stripe rejects the request
    /// - [`StripeError::MissingRedirectUrl`] if the created session has no URL
    #[instrument(skip_all, fields(lines = lines.len()))]
    pub async fn create_checkout_session(
        &self,
        lines: &[PricedLine],
        cart: &CartSnapshot,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let cart_json = cart
            .to_metadata_json()
            .map_err(|e| StripeError::Parse(e.to_string()))?;

        // Stripe's REST API takes bracket-indexed form fields rather than a
        // JSON body.
        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), success_url.into()),
            ("cancel_url".into(), cancel_url.into()),
            ("phone_number_collection[enabled]".into(), "true".into()),
            ("metadata[cart]".into(), cart_json),
            ("metadata[created_from]".into(), CREATED_FROM.into()),
        ];

        for (i, country) in ALLOWED_SHIPPING_COUNTRIES.iter().enumerate() {
            params.push((
                format!("shipping_address_collection[allowed_countries][{i}]"),
                (*country).to_string(),
            ));
        }

        for (i, line) in lines.iter().enumerate() {
            params.push((
                format!("line_items[{i}][quantity]"),
                line.item.quantity.to_string(),
            ));
            params.push((
                format!("line_items[{i}][price_data][currency]"),
                CurrencyCode::USD.code().to_string(),
            ));
            params.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                line.unit_amount.as_minor().to_string(),
            ));
            params.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                line.product_name.clone(),
            ));
            params.push((
                format!("line_items[{i}][price_data][product_data][metadata][product_id]"),
                line.item.product_id.clone(),
            ));
            params.push((
                format!("line_items[{i}][price_data][product_data][metadata][variant_id]"),
                line.item.variant_id.clone(),
            ));
        }

        let url = format!("{}/v1/checkout/sessions", self.inner.api_base);
        let response = self.inner.client.post(&url).form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("checkout session creation failed")
                .to_string();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))?;

        if session.url.is_none() {
            return Err(StripeError::MissingRedirectUrl);
        }

        Ok(session)
    }
}
