//! Order normalization: raw request body in, validated [`Order`] out.
//!
//! Validation errors are always itemized - which fields, at which line-item
//! index - so a caller can correct its payload instead of guessing at a
//! generic error. Nothing here touches the network; the gateway only ever
//! sees orders that passed this gate.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use shepherd_core::{
    ExternalId, LineItem, MAX_LINE_QUANTITY, REQUIRED_ADDRESS_FIELDS, ShippingAddress,
    quantity_in_range,
};

use crate::validate::{coerce_quantity, coerce_string, is_nonempty_string, missing_fields, strict_bool_true};

use super::types::{Order, OrderRequest};

/// Fields every line item must carry.
const REQUIRED_LINE_ITEM_FIELDS: [&str; 3] = ["product_id", "variant_id", "quantity"];

/// Structured validation failure for an order request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderValidationError {
    #[error("line_items must be a non-empty array")]
    EmptyLineItems,

    #[error("line_items[{index}] missing fields")]
    LineItemMissingFields {
        index: usize,
        missing: Vec<&'static str>,
    },

    #[error("line_items[{index}].quantity must be an integer between 1 and {MAX_LINE_QUANTITY}")]
    InvalidQuantity { index: usize },

    #[error("address_to is missing required fields")]
    AddressMissingFields { missing: Vec<&'static str> },

    #[error("address_to.phone must be a non-empty string if provided")]
    InvalidPhone,
}

impl OrderValidationError {
    /// The itemized list of missing fields, when this error carries one.
    #[must_use]
    pub fn missing(&self) -> Option<&[&'static str]> {
        match self {
            Self::LineItemMissingFields { missing, .. } | Self::AddressMissingFields { missing } => {
                Some(missing)
            }
            _ => None,
        }
    }
}

/// Validate and coerce a raw order request into a submission-ready [`Order`].
///
/// # Errors
///
/// Returns [`OrderValidationError`] naming the offending fields; no partial
/// orders are ever produced.
pub fn normalize_order(
    request: OrderRequest,
    now: DateTime<Utc>,
    default_label: &str,
) -> Result<Order, OrderValidationError> {
    let raw_items = match request.line_items.as_ref().and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => return Err(OrderValidationError::EmptyLineItems),
    };

    let address_to = normalize_address(request.address_to.as_ref())?;

    let mut line_items = Vec::with_capacity(raw_items.len());
    for (index, raw) in raw_items.iter().enumerate() {
        line_items.push(normalize_line_item(index, raw)?);
    }

    let external_id = request
        .external_id
        .as_ref()
        .and_then(coerce_string)
        .filter(|id| !id.is_empty())
        .map_or_else(|| ExternalId::fallback_at(now), ExternalId::new);

    let label = request
        .label
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| default_label.to_string());

    Ok(Order {
        external_id,
        label,
        line_items,
        address_to,
        // Only the strict boolean `true` sends an order into production;
        // everything else stays a draft.
        send_to_production: strict_bool_true(request.send_to_production.as_ref()),
    })
}

fn normalize_line_item(index: usize, raw: &Value) -> Result<LineItem, OrderValidationError> {
    let obj = raw.as_object().ok_or_else(|| {
        OrderValidationError::LineItemMissingFields {
            index,
            missing: REQUIRED_LINE_ITEM_FIELDS.to_vec(),
        }
    })?;

    let missing = missing_fields(obj, &REQUIRED_LINE_ITEM_FIELDS);
    if !missing.is_empty() {
        return Err(OrderValidationError::LineItemMissingFields { index, missing });
    }

    let product_id = obj
        .get("product_id")
        .and_then(coerce_string)
        .ok_or(OrderValidationError::LineItemMissingFields {
            index,
            missing: vec!["product_id"],
        })?;
    let variant_id = obj
        .get("variant_id")
        .and_then(coerce_string)
        .ok_or(OrderValidationError::LineItemMissingFields {
            index,
            missing: vec!["variant_id"],
        })?;

    let quantity = obj
        .get("quantity")
        .and_then(coerce_quantity)
        .filter(|&q| quantity_in_range(q))
        .ok_or(OrderValidationError::InvalidQuantity { index })?;

    Ok(LineItem::new(product_id, variant_id, quantity))
}

fn normalize_address(raw: Option<&Value>) -> Result<ShippingAddress, OrderValidationError> {
    let obj = raw.and_then(Value::as_object).ok_or_else(|| {
        OrderValidationError::AddressMissingFields {
            missing: REQUIRED_ADDRESS_FIELDS.to_vec(),
        }
    })?;

    let missing = missing_fields(obj, &REQUIRED_ADDRESS_FIELDS);
    if !missing.is_empty() {
        return Err(OrderValidationError::AddressMissingFields { missing });
    }

    // Optional, but providers sometimes hold orders without it - so when a
    // phone is present it must actually contain something.
    if let Some(phone) = obj.get("phone")
        && !phone.is_null()
        && !is_nonempty_string(phone)
    {
        return Err(OrderValidationError::InvalidPhone);
    }

    let required = |field: &str| {
        obj.get(field)
            .and_then(coerce_string)
            .unwrap_or_default()
    };
    let optional = |field: &str| {
        obj.get(field)
            .filter(|v| is_nonempty_string(v))
            .and_then(coerce_string)
    };

    Ok(ShippingAddress {
        first_name: required("first_name"),
        last_name: required("last_name"),
        email: optional("email"),
        phone: optional("phone"),
        address1: required("address1"),
        address2: optional("address2"),
        city: required("city"),
        region: required("region"),
        zip: required("zip"),
        country: required("country"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn request(body: Value) -> OrderRequest {
        serde_json::from_value(body).unwrap()
    }

    fn full_address() -> Value {
        json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "address1": "1 Analytical Way",
            "city": "Miami",
            "region": "FL",
            "country": "US",
            "zip": "33101"
        })
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_happy_path_coerces_numeric_ids() {
        let order = normalize_order(
            request(json!({
                "line_items": [{"product_id": 123, "variant_id": "v1", "quantity": "2"}],
                "address_to": full_address(),
                "external_id": "cs_test_1"
            })),
            now(),
            "Forever Shepherd Order",
        )
        .unwrap();

        assert_eq!(order.line_items, vec![LineItem::new("123", "v1", 2)]);
        assert_eq!(order.external_id.as_str(), "cs_test_1");
        assert_eq!(order.label, "Forever Shepherd Order");
        assert!(!order.send_to_production);
    }

    #[test]
    fn test_empty_line_items_rejected() {
        let err = normalize_order(
            request(json!({"line_items": [], "address_to": full_address()})),
            now(),
            "label",
        )
        .unwrap_err();
        assert_eq!(err, OrderValidationError::EmptyLineItems);

        let err = normalize_order(
            request(json!({"address_to": full_address()})),
            now(),
            "label",
        )
        .unwrap_err();
        assert_eq!(err, OrderValidationError::EmptyLineItems);
    }

    #[test]
    fn test_missing_region_reported_by_name() {
        let mut address = full_address();
        address.as_object_mut().unwrap().remove("region");

        let err = normalize_order(
            request(json!({
                "line_items": [{"product_id": "p1", "variant_id": "v1", "quantity": 1}],
                "address_to": address
            })),
            now(),
            "label",
        )
        .unwrap_err();

        assert_eq!(
            err,
            OrderValidationError::AddressMissingFields {
                missing: vec!["region"]
            }
        );
        assert_eq!(err.missing(), Some(&["region"][..]));
    }

    #[test]
    fn test_empty_string_address_field_counts_as_missing() {
        let mut address = full_address();
        address
            .as_object_mut()
            .unwrap()
            .insert("zip".to_string(), json!(""));

        let err = normalize_order(
            request(json!({
                "line_items": [{"product_id": "p1", "variant_id": "v1", "quantity": 1}],
                "address_to": address
            })),
            now(),
            "label",
        )
        .unwrap_err();

        assert_eq!(
            err,
            OrderValidationError::AddressMissingFields {
                missing: vec!["zip"]
            }
        );
    }

    #[test]
    fn test_line_item_missing_fields_reported_per_index() {
        let err = normalize_order(
            request(json!({
                "line_items": [
                    {"product_id": "p1", "variant_id": "v1", "quantity": 1},
                    {"product_id": "p2"}
                ],
                "address_to": full_address()
            })),
            now(),
            "label",
        )
        .unwrap_err();

        assert_eq!(
            err,
            OrderValidationError::LineItemMissingFields {
                index: 1,
                missing: vec!["variant_id", "quantity"]
            }
        );
    }

    #[test]
    fn test_quantity_out_of_range_rejected() {
        for quantity in [json!(0), json!(21), json!(2.5), json!("nope")] {
            let result = normalize_order(
                request(json!({
                    "line_items": [{"product_id": "p1", "variant_id": "v1", "quantity": quantity}],
                    "address_to": full_address()
                })),
                now(),
                "label",
            );
            assert!(
                matches!(
                    result,
                    Err(OrderValidationError::InvalidQuantity { index: 0 })
                        | Err(OrderValidationError::LineItemMissingFields { .. })
                ),
                "quantity {quantity:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_send_to_production_string_true_normalizes_to_false() {
        let body = |flag: Value| {
            request(json!({
                "line_items": [{"product_id": "p1", "variant_id": "v1", "quantity": 1}],
                "address_to": full_address(),
                "send_to_production": flag
            }))
        };

        assert!(!normalize_order(body(json!("true")), now(), "l").unwrap().send_to_production);
        assert!(!normalize_order(body(json!(1)), now(), "l").unwrap().send_to_production);
        assert!(normalize_order(body(json!(true)), now(), "l").unwrap().send_to_production);
    }

    #[test]
    fn test_phone_must_be_nonempty_when_present() {
        let mut address = full_address();
        address
            .as_object_mut()
            .unwrap()
            .insert("phone".to_string(), json!(""));

        let err = normalize_order(
            request(json!({
                "line_items": [{"product_id": "p1", "variant_id": "v1", "quantity": 1}],
                "address_to": address
            })),
            now(),
            "label",
        )
        .unwrap_err();

        assert_eq!(err, OrderValidationError::InvalidPhone);
    }

    #[test]
    fn test_external_id_fallback_is_timestamp_based() {
        let order = normalize_order(
            request(json!({
                "line_items": [{"product_id": "p1", "variant_id": "v1", "quantity": 1}],
                "address_to": full_address()
            })),
            now(),
            "label",
        )
        .unwrap();

        assert_eq!(
            order.external_id.as_str(),
            format!("fs_{}", now().timestamp_millis())
        );
    }
}
