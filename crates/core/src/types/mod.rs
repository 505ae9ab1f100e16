//! Shared domain types.
//!
//! All types here are plain data with serde support. Validation that depends
//! on request context (missing-field reporting, coercion of loosely-typed
//! JSON) lives in the server crate; these types hold the invariants that are
//! true everywhere.

pub mod address;
pub mod id;
pub mod line_item;
pub mod price;

pub use address::{REQUIRED_ADDRESS_FIELDS, ShippingAddress};
pub use id::{AffiliateCode, ExternalId, SessionId};
pub use line_item::{CartSnapshot, LineItem, MAX_LINE_QUANTITY, quantity_in_range};
pub use price::{CurrencyCode, UnitAmount};
