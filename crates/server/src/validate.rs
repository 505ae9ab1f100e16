//! Shared field coercion and validation for loosely-typed request payloads.
//!
//! Every inbound surface (checkout, direct order creation, the webhook
//! dispatcher) funnels through these helpers, so type-drift rules live in
//! exactly one place: identifiers may arrive as numbers, quantities as
//! numeric strings, and `send_to_production` as any truthy-looking value,
//! and all of them normalize the same way everywhere.

use serde_json::{Map, Value};

/// Coerce an identifier value to a string.
///
/// Strings pass through, integers are stringified (different callers send
/// `"123"` and `123` for the same variant id). Everything else is rejected.
#[must_use]
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a quantity value to a positive integer.
///
/// Accepts JSON integers and numeric strings; rejects fractional numbers,
/// zero, negatives, and non-numeric values. Range clamping against the
/// per-line maximum is the caller's concern.
#[must_use]
pub fn coerce_quantity(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            let as_u64 = n.as_u64()?;
            u32::try_from(as_u64).ok().filter(|&q| q >= 1)
        }
        Value::String(s) => s.trim().parse::<u32>().ok().filter(|&q| q >= 1),
        _ => None,
    }
}

/// Collect the required fields that are absent, null, or empty-string.
#[must_use]
pub fn missing_fields(obj: &Map<String, Value>, required: &[&'static str]) -> Vec<&'static str> {
    required
        .iter()
        .filter(|field| {
            match obj.get(**field) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            }
        })
        .copied()
        .collect()
}

/// Whether a value is a non-empty string (after trimming).
#[must_use]
pub fn is_nonempty_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if !s.trim().is_empty())
}

/// Strict boolean gate: only the JSON boolean `true` counts.
///
/// The string `"true"`, the number `1`, and every other truthy-looking value
/// normalize to `false`. This is the safety rail that keeps loosely-typed
/// callers from accidentally pushing orders into production.
#[must_use]
pub fn strict_bool_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_string_passthrough_and_numbers() {
        assert_eq!(coerce_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(coerce_string(&json!(123)), Some("123".to_string()));
        assert_eq!(coerce_string(&json!(null)), None);
        assert_eq!(coerce_string(&json!(["x"])), None);
    }

    #[test]
    fn test_coerce_quantity_integers() {
        assert_eq!(coerce_quantity(&json!(2)), Some(2));
        assert_eq!(coerce_quantity(&json!(1)), Some(1));
        assert_eq!(coerce_quantity(&json!(0)), None);
        assert_eq!(coerce_quantity(&json!(-3)), None);
    }

    #[test]
    fn test_coerce_quantity_rejects_fractional() {
        assert_eq!(coerce_quantity(&json!(2.5)), None);
        assert_eq!(coerce_quantity(&json!("2.5")), None);
    }

    #[test]
    fn test_coerce_quantity_numeric_strings() {
        assert_eq!(coerce_quantity(&json!("3")), Some(3));
        assert_eq!(coerce_quantity(&json!(" 4 ")), Some(4));
        assert_eq!(coerce_quantity(&json!("lots")), None);
    }

    #[test]
    fn test_missing_fields_treats_empty_string_as_missing() {
        let obj = json!({
            "first_name": "Ada",
            "last_name": "",
            "city": null,
        });
        let missing = missing_fields(
            obj.as_object().expect("object"),
            &["first_name", "last_name", "city", "zip"],
        );
        assert_eq!(missing, vec!["last_name", "city", "zip"]);
    }

    #[test]
    fn test_strict_bool_true_only_accepts_boolean_true() {
        assert!(strict_bool_true(Some(&json!(true))));
        assert!(!strict_bool_true(Some(&json!("true"))));
        assert!(!strict_bool_true(Some(&json!(1))));
        assert!(!strict_bool_true(Some(&json!(false))));
        assert!(!strict_bool_true(None));
    }

    #[test]
    fn test_is_nonempty_string() {
        assert!(is_nonempty_string(&json!("555-0100")));
        assert!(!is_nonempty_string(&json!("")));
        assert!(!is_nonempty_string(&json!("   ")));
        assert!(!is_nonempty_string(&json!(42)));
    }
}
