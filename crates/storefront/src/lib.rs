//! Packon Storefront library.
//!
//! Everything that talks to the commerce backend or owns mutable shared state:
//!
//! - [`shopify`] - Storefront API client (catalog reads, cart gateway)
//! - [`cart`] - Cart state manager, persisted cart identity, snapshots
//! - [`shipping`] - Shipping estimate seam
//! - [`config`] / [`error`] - Environment configuration and error reporting
//!
//! Variant resolution lives in `packon-core`; this crate consumes the variant
//! ids it produces.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod shipping;
pub mod shopify;

pub use cart::{
    CartError, CartErrorKind, CartGateway, CartIdentityStore, CartSnapshot, CartStateManager,
    FileCartIdentityStore, GatewayError, MemoryCartIdentityStore,
};
pub use config::StorefrontConfig;
pub use error::{AppError, add_breadcrumb};
pub use shipping::{PostalCode, ShippingEstimator, StaticShippingEstimator};
pub use shopify::{ShopifyError, StorefrontClient};
