//! Observable cart state.

use packon_core::Money;

use super::error::CartErrorKind;
use crate::shopify::{Cart, CartLine};

/// What display surfaces render: the last confirmed cart, the drawer
/// visibility flag, and the kind of the most recent failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    pub cart: Option<Cart>,
    pub is_open: bool,
    pub last_error: Option<CartErrorKind>,
}

impl CartSnapshot {
    /// Badge count: sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.as_ref().map_or(0, Cart::item_count)
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.as_ref().map_or(&[], |cart| cart.lines.as_slice())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    #[must_use]
    pub fn subtotal(&self) -> Option<Money> {
        self.cart.as_ref().map(|cart| cart.cost.subtotal)
    }

    #[must_use]
    pub fn total(&self) -> Option<Money> {
        self.cart.as_ref().map(|cart| cart.cost.total)
    }
}
