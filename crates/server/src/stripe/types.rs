//! Domain types for the Stripe Checkout API and webhook events.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use shepherd_core::{SessionId, ShippingAddress};

/// The single webhook event type this service acts on.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// A created checkout session, as returned by the session-create call.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: SessionId,
    /// Hosted checkout redirect URL. Present on freshly created sessions.
    pub url: Option<String>,
}

/// A verified webhook event envelope.
///
/// `data.object` stays untyped here: only `checkout.session.completed`
/// events are ever parsed further, and other event types carry arbitrarily
/// shaped objects.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

/// Payload wrapper inside an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

/// The checkout session object carried by a completed-checkout event.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: SessionId,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

impl CheckoutSessionObject {
    /// Whether the session has actually been paid.
    ///
    /// Checked independently of the event type as defense in depth against
    /// misleading events.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

/// Customer details collected by the hosted checkout page.
///
/// This is the authoritative source for the shipping address; the address a
/// client submitted before paying is never re-trusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<EventAddress>,
}

/// Address shape used inside webhook events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventAddress {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl CustomerDetails {
    /// Derive a shipping address from the provider-collected details.
    ///
    /// Fields the provider did not collect come back empty and will fail
    /// order validation downstream, which is the intended trust boundary.
    #[must_use]
    pub fn shipping_address(&self) -> ShippingAddress {
        let (first_name, last_name) = split_name(self.name.as_deref().unwrap_or_default());
        let address = self.address.clone().unwrap_or_default();

        ShippingAddress {
            first_name,
            last_name,
            email: self.email.clone().filter(|s| !s.is_empty()),
            phone: self.phone.clone().filter(|s| !s.is_empty()),
            address1: address.line1.unwrap_or_default(),
            address2: address.line2.filter(|s| !s.is_empty()),
            city: address.city.unwrap_or_default(),
            region: address.state.unwrap_or_default(),
            zip: address.postal_code.unwrap_or_default(),
            country: address.country.unwrap_or_else(|| "US".to_string()),
        }
    }
}

/// Split a full name into (first, last) the way checkout forms collect it.
fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = parts.collect();
    (first, rest.join(" "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name_variants() {
        assert_eq!(split_name("Ada Lovelace"), ("Ada".into(), "Lovelace".into()));
        assert_eq!(
            split_name("Ada King Lovelace"),
            ("Ada".into(), "King Lovelace".into())
        );
        assert_eq!(split_name("Ada"), ("Ada".into(), String::new()));
        assert_eq!(split_name("   "), (String::new(), String::new()));
    }

    #[test]
    fn test_shipping_address_from_details() {
        let details: CustomerDetails = serde_json::from_value(serde_json::json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "555-0100",
            "address": {
                "line1": "1 Analytical Way",
                "city": "Miami",
                "state": "FL",
                "postal_code": "33101",
                "country": "US"
            }
        }))
        .unwrap();

        let address = details.shipping_address();
        assert_eq!(address.first_name, "Ada");
        assert_eq!(address.last_name, "Lovelace");
        assert_eq!(address.region, "FL");
        assert_eq!(address.phone.as_deref(), Some("555-0100"));
        assert_eq!(address.address2, None);
    }

    #[test]
    fn test_missing_details_produce_empty_required_fields() {
        let details = CustomerDetails::default();
        let address = details.shipping_address();
        assert!(address.first_name.is_empty());
        assert!(address.city.is_empty());
        // Downstream validation rejects these before any provider call.
    }

    #[test]
    fn test_is_paid() {
        let paid: CheckoutSessionObject = serde_json::from_value(serde_json::json!({
            "id": "cs_1", "payment_status": "paid"
        }))
        .unwrap();
        assert!(paid.is_paid());

        let unpaid: CheckoutSessionObject = serde_json::from_value(serde_json::json!({
            "id": "cs_2", "payment_status": "unpaid"
        }))
        .unwrap();
        assert!(!unpaid.is_paid());
    }
}
