//! Cart line items and the metadata cart snapshot.
//!
//! A [`LineItem`] is one product/variant/quantity tuple. The
//! [`CartSnapshot`] is the serialized form threaded through the payment
//! provider's session metadata - it is the only state connecting the
//! checkout call to the webhook that fires after payment.

use serde::{Deserialize, Serialize};

/// Upper bound on the quantity of a single line, per checkout and per order.
pub const MAX_LINE_QUANTITY: u32 = 20;

/// Whether a quantity is within the accepted range (1..=20).
#[must_use]
pub const fn quantity_in_range(quantity: u32) -> bool {
    quantity >= 1 && quantity <= MAX_LINE_QUANTITY
}

/// One product/variant/quantity tuple within a cart or order.
///
/// Identifiers are always strings on the wire; numeric ids from
/// loosely-typed callers are coerced before a `LineItem` is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Fulfillment provider product id.
    pub product_id: String,
    /// Fulfillment provider variant id.
    pub variant_id: String,
    /// Number of units, always >= 1.
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item from already-validated parts.
    #[must_use]
    pub fn new(product_id: impl Into<String>, variant_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            quantity,
        }
    }
}

/// The cart as captured at checkout time.
///
/// Serialized into the checkout session's metadata bag and read back by the
/// webhook handler after payment completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot(pub Vec<LineItem>);

impl CartSnapshot {
    /// Serialize for storage in session metadata.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails (it cannot for
    /// these types, but the signature stays honest).
    pub fn to_metadata_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Parse a snapshot back out of session metadata.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the metadata value is not a valid
    /// cart snapshot.
    pub fn from_metadata_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self)
    }

    /// Line items in cart order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.0
    }

    /// Whether the snapshot holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
