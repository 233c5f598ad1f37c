//! Shared state for one CLI invocation.

use std::sync::Arc;

use packon_core::QuantityPicker;
use packon_storefront::{
    AppError, CartStateManager, FileCartIdentityStore, StaticShippingEstimator, StorefrontClient,
    StorefrontConfig,
};

pub struct Context {
    pub config: StorefrontConfig,
    pub client: StorefrontClient,
}

impl Context {
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let client = StorefrontClient::new(&config.shopify, config.product_cache_ttl)?;
        Ok(Self { config, client })
    }

    /// Cart manager backed by the Storefront API and the cart file.
    pub fn cart_manager(&self) -> CartStateManager {
        CartStateManager::spawn(
            Arc::new(self.client.clone()),
            Arc::new(FileCartIdentityStore::new(&self.config.cart_store_path)),
        )
    }

    pub fn quantity_picker(&self) -> QuantityPicker {
        let q = self.config.quantity;
        QuantityPicker::new(q.initial, q.step, q.min)
    }

    pub fn shipping_estimator(&self) -> StaticShippingEstimator {
        StaticShippingEstimator::new(self.config.shipping_message.clone())
    }
}
