//! Shepherd Core - Shared types library.
//!
//! This crate provides the domain types shared across the Shepherd Commerce
//! components:
//! - `server` - Checkout, payment-webhook, and order-fulfillment service
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, minor-unit prices, cart line items, and
//!   shipping addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
