//! [`CartGateway`] backed by the Storefront API.

use async_trait::async_trait;
use packon_core::{CartId, CartLineId};

use crate::cart::{CartGateway, GatewayError};
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdate};
use crate::shopify::ShopifyError;

use super::StorefrontClient;

impl From<ShopifyError> for GatewayError {
    fn from(error: ShopifyError) -> Self {
        if matches!(error, ShopifyError::NotFound(_)) {
            Self::Missing
        } else if error.is_transient() {
            Self::Transport(error.to_string())
        } else {
            Self::Rejected(error.to_string())
        }
    }
}

#[async_trait]
impl CartGateway for StorefrontClient {
    async fn create_cart(&self) -> Result<Cart, GatewayError> {
        Ok(Self::create_cart(self).await?)
    }

    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, GatewayError> {
        Ok(self.add_to_cart(cart_id, lines).await?)
    }

    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, GatewayError> {
        Ok(self.update_cart(cart_id, lines).await?)
    }

    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, GatewayError> {
        Ok(self.remove_from_cart(cart_id, line_ids).await?)
    }

    async fn read_cart(&self, cart_id: &CartId) -> Result<Cart, GatewayError> {
        Ok(self.get_cart(cart_id).await?)
    }
}
