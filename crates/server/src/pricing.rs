//! Authoritative server-side price lookup.
//!
//! Checkout never trusts a client-supplied amount. Every line is priced
//! here, keyed by (product id, variant id), with a configured fallback for
//! products not in the table. The table is loaded once at startup from the
//! `PRICE_TABLE` JSON map.

use std::collections::HashMap;

use shepherd_core::UnitAmount;
use thiserror::Error;

use crate::config::PricingConfig;

/// Error building the price table from configuration.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("invalid PRICE_TABLE JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid PRICE_TABLE key {0:?}: expected \"product_id:variant_id\"")]
    InvalidKey(String),
}

/// Trusted price lookup keyed by product and variant.
#[derive(Debug, Clone)]
pub struct PriceTable {
    prices: HashMap<(String, String), UnitAmount>,
    default: UnitAmount,
}

impl PriceTable {
    /// Build the table from pricing configuration.
    ///
    /// # Errors
    ///
    /// Returns `PricingError` if the configured JSON is malformed or a key
    /// is not of the form `"product_id:variant_id"`.
    pub fn from_config(config: &PricingConfig) -> Result<Self, PricingError> {
        let mut prices = HashMap::new();

        if let Some(raw) = &config.price_table_json {
            let table: HashMap<String, i64> = serde_json::from_str(raw)?;
            for (key, cents) in table {
                let (product_id, variant_id) = key
                    .split_once(':')
                    .ok_or_else(|| PricingError::InvalidKey(key.clone()))?;
                prices.insert(
                    (product_id.to_string(), variant_id.to_string()),
                    UnitAmount::from_minor(cents),
                );
            }
        }

        Ok(Self {
            prices,
            default: UnitAmount::from_minor(config.default_unit_amount),
        })
    }

    /// Resolve the unit amount for a product variant.
    #[must_use]
    pub fn unit_amount(&self, product_id: &str, variant_id: &str) -> UnitAmount {
        self.prices
            .get(&(product_id.to_string(), variant_id.to_string()))
            .copied()
            .unwrap_or(self.default)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_price_when_table_absent() {
        let table = PriceTable::from_config(&PricingConfig {
            default_unit_amount: 2499,
            price_table_json: None,
        })
        .unwrap();

        assert_eq!(table.unit_amount("p1", "v1").as_minor(), 2499);
    }

    #[test]
    fn test_table_entry_overrides_default() {
        let table = PriceTable::from_config(&PricingConfig {
            default_unit_amount: 2499,
            price_table_json: Some(r#"{"fs-black-tee:v1": 3800}"#.to_string()),
        })
        .unwrap();

        assert_eq!(table.unit_amount("fs-black-tee", "v1").as_minor(), 3800);
        assert_eq!(table.unit_amount("fs-black-tee", "v2").as_minor(), 2499);
    }

    #[test]
    fn test_malformed_key_is_rejected() {
        let result = PriceTable::from_config(&PricingConfig {
            default_unit_amount: 2499,
            price_table_json: Some(r#"{"no-variant-separator": 3800}"#.to_string()),
        });

        assert!(matches!(result, Err(PricingError::InvalidKey(_))));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let result = PriceTable::from_config(&PricingConfig {
            default_unit_amount: 2499,
            price_table_json: Some("{not json".to_string()),
        });

        assert!(matches!(result, Err(PricingError::InvalidJson(_))));
    }
}
