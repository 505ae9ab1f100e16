//! Wire types for the Printify order API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use shepherd_core::{ExternalId, LineItem, ShippingAddress};

/// A normalized order, ready for submission to Printify.
///
/// Construct via [`super::normalize::normalize_order`]; the fields are only
/// public so the gateway and tests can inspect what goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Correlation id, derived from the payment session when one exists.
    pub external_id: ExternalId,
    /// Human-readable label shown in the Printify dashboard.
    pub label: String,
    pub line_items: Vec<LineItem>,
    pub address_to: ShippingAddress,
    /// `false` leaves the order as a reviewable draft.
    pub send_to_production: bool,
}

/// Raw order-creation request body, before normalization.
///
/// Fields are deliberately loose (`Value`) because callers disagree on
/// types: numeric ids, string quantities, string `"true"` production flags.
/// The normalizer is the single place those disagreements get resolved.
#[derive(Debug, Default, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub line_items: Option<Value>,
    #[serde(default)]
    pub address_to: Option<Value>,
    #[serde(default)]
    pub external_id: Option<Value>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub send_to_production: Option<Value>,
}

/// Successful provider response to an order submission.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmission {
    /// HTTP status returned by the provider.
    pub status: u16,
    /// Provider response body, passed through for operator diagnosis.
    pub data: Value,
}
