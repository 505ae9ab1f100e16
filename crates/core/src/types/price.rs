//! Minor-currency-unit price representation.
//!
//! Checkout pricing is computed server-side in integer minor units (cents for
//! USD) and handed to the payment provider unchanged. `rust_decimal` is used
//! only for display formatting, never for arithmetic on the wire amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit amount in the smallest currency unit (e.g. cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitAmount(i64);

impl UnitAmount {
    /// Create a unit amount from minor units (cents).
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Get the amount in minor units.
    #[must_use]
    pub const fn as_minor(&self) -> i64 {
        self.0
    }

    /// Multiply by a quantity, saturating on overflow.
    #[must_use]
    pub const fn line_total(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Format for display (e.g. "$24.99").
    #[must_use]
    pub fn display(&self, currency: CurrencyCode) -> String {
        let amount = Decimal::new(self.0, 2);
        format!("{}{amount:.2}", currency.symbol())
    }
}

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }

    /// Lowercase code as the payment provider expects it (e.g. "usd").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "usd",
            Self::EUR => "eur",
            Self::GBP => "gbp",
            Self::CAD => "cad",
            Self::AUD => "aud",
        }
    }
}
