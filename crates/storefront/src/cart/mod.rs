//! Cart state management.
//!
//! - [`CartGateway`] - remote cart operations (implemented by
//!   [`StorefrontClient`](crate::shopify::StorefrontClient))
//! - [`CartIdentityStore`] - where the cart id survives restarts
//! - [`CartStateManager`] - serialized mutations and the observable
//!   [`CartSnapshot`]

mod error;
mod gateway;
mod manager;
mod snapshot;
mod store;

pub use error::{CartError, CartErrorKind};
pub use gateway::{CartGateway, GatewayError};
pub use manager::CartStateManager;
pub use snapshot::CartSnapshot;
pub use store::{
    CART_STORAGE_KEY, CartIdentityStore, FileCartIdentityStore, MemoryCartIdentityStore,
    StorageError,
};
