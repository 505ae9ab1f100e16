//! Shipping address for fulfillment orders.

use serde::{Deserialize, Serialize};

/// Address fields the fulfillment provider refuses to produce without.
///
/// `region` (the state for US addresses) is required even though some
/// providers accept orders without it - missing regions put orders into an
/// "on hold, address issues" state instead of failing fast.
pub const REQUIRED_ADDRESS_FIELDS: [&str; 7] = [
    "first_name",
    "last_name",
    "address1",
    "city",
    "region",
    "country",
    "zip",
];

/// A normalized shipping address.
///
/// Required fields are plain `String`s and are guaranteed non-empty once the
/// address has passed validation; optional fields are omitted from the wire
/// format when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    /// State or province code (e.g. "FL").
    pub region: String,
    pub zip: String,
    /// ISO 3166-1 alpha-2 country code (e.g. "US").
    pub country: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            phone: None,
            address1: "1 Analytical Way".to_string(),
            address2: None,
            city: "Miami".to_string(),
            region: "FL".to_string(),
            zip: "33101".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_optional_fields_omitted_from_wire() {
        let json = serde_json::to_value(full_address()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("phone"));
        assert!(!obj.contains_key("address2"));
        assert_eq!(obj["region"], "FL");
    }

    #[test]
    fn test_required_field_list_matches_struct() {
        let json = serde_json::to_value(full_address()).unwrap();
        let obj = json.as_object().unwrap();
        for field in REQUIRED_ADDRESS_FIELDS {
            assert!(obj.contains_key(field), "missing required field {field}");
        }
    }
}
