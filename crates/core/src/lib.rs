//! Packon Core - catalog types and variant resolution.
//!
//! This crate provides the types shared by every Packon component and the
//! logic that turns option clicks into a concrete, sellable variant:
//! - `storefront` - Shopify gateway and cart state manager
//! - `cli` - Terminal storefront client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no shared state. Everything here is synchronous and can be called
//! on every click without debouncing.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, money, and catalog records
//! - [`variants`] - Variant resolution engine
//! - [`selection`] - Per-product selection state built on [`variants`]
//! - [`quantity`] - Stepped quantity picker

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod quantity;
pub mod selection;
pub mod types;
pub mod variants;

#[cfg(test)]
mod test_support;

pub use quantity::QuantityPicker;
pub use selection::{AddTarget, SelectionChange, VariantSelection};
pub use types::*;
