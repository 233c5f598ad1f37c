//! Core types for Packon.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod id;
pub mod money;

pub use catalog::{Image, PriceRange, Product, ProductOption, SelectedOption, SelectedOptions, Variant};
pub use id::*;
pub use money::{CurrencyCode, Money, UnknownCurrency};
