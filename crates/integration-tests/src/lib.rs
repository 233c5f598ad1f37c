//! Integration test support for the Packon storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p packon-integration-tests
//! ```
//!
//! Everything runs in memory; no Shopify credentials are needed.
//!
//! - [`backend::FakeBackend`] - cart gateway double with merge semantics,
//!   scripted failures, response latency and call counters
//! - [`fixtures`] - catalog products for variant resolution scenarios

pub mod backend;
pub mod fixtures;

pub use backend::{FakeBackend, Operation};
