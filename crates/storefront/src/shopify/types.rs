//! Cart types for the Shopify Storefront API.
//!
//! These types provide a clean, validated API separate from the raw wire
//! records in `storefront::conversions`. Catalog types (products, variants)
//! live in `packon-core` so variant resolution can use them without I/O.

use std::num::NonZeroU32;

use packon_core::{CartId, CartLineId, Image, Money, SelectedOptions, VariantId};
use serde::{Deserialize, Serialize};
use url::Url;

/// Variant title Shopify uses when a product has no options.
pub const DEFAULT_VARIANT_TITLE: &str = "Default Title";

// =============================================================================
// Cart Types
// =============================================================================

/// Simplified product info for cart merchandise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    /// Product title.
    pub title: String,
    /// Product handle.
    pub handle: String,
    /// First product image.
    pub image: Option<Image>,
}

/// Merchandise snapshot on a cart line, taken when the backend answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title.
    pub title: String,
    /// Unit price.
    pub price: Money,
    /// Selected options.
    pub selected_options: SelectedOptions,
    /// Parent product info.
    pub product: CartProduct,
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID (assigned by the backend).
    pub id: CartLineId,
    /// Quantity.
    pub quantity: NonZeroU32,
    /// Product variant.
    pub merchandise: CartMerchandise,
}

impl CartLine {
    /// Variant label for display, hiding Shopify's placeholder title.
    #[must_use]
    pub fn variant_label(&self) -> Option<&str> {
        if self.merchandise.title == DEFAULT_VARIANT_TITLE {
            None
        } else {
            Some(&self.merchandise.title)
        }
    }
}

/// Cart cost summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCost {
    /// Subtotal before tax/shipping.
    pub subtotal: Money,
    /// Total amount.
    pub total: Money,
}

/// A shopping cart as last confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Checkout URL.
    pub checkout_url: Url,
    /// Total item quantity.
    pub total_quantity: u32,
    /// Cost summary.
    pub cost: CartCost,
    /// Cart lines, one per variant.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// The line holding `variant_id`, if any.
    #[must_use]
    pub fn line_for(&self, variant_id: &VariantId) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| &line.merchandise.id == variant_id)
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity.get()))
    }
}

/// Input for adding a line to cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: VariantId,
    /// Quantity to add.
    pub quantity: NonZeroU32,
}

/// Input for updating a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineUpdate {
    /// Cart line ID.
    pub id: CartLineId,
    /// New quantity.
    pub quantity: NonZeroU32,
}

/// A collection of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// URL handle.
    pub handle: String,
    /// Collection title.
    pub title: String,
    /// Collection image.
    pub image: Option<Image>,
}

/// A product as listed in a collection grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Lowest variant price.
    pub min_price: Money,
    /// First product image.
    pub image: Option<Image>,
    /// First variant, for a one-click buy button.
    pub first_variant: Option<VariantSummary>,
}

/// Minimal variant info for listing grids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSummary {
    /// Variant ID.
    pub id: VariantId,
    /// Whether available for sale.
    pub available_for_sale: bool,
}
