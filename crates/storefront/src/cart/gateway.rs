//! The remote cart seam.

use async_trait::async_trait;
use packon_core::{CartId, CartLineId};
use thiserror::Error;

use crate::shopify::{Cart, CartLineInput, CartLineUpdate};

/// Why a gateway call produced no cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend answered but has no such cart.
    #[error("cart not found")]
    Missing,

    /// The backend returned an explicit error payload.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The request never produced a usable answer.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Remote cart operations. Every successful call returns the full,
/// authoritative cart.
#[async_trait]
pub trait CartGateway: Send + Sync {
    async fn create_cart(&self) -> Result<Cart, GatewayError>;

    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, GatewayError>;

    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, GatewayError>;

    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, GatewayError>;

    async fn read_cart(&self, cart_id: &CartId) -> Result<Cart, GatewayError>;
}
