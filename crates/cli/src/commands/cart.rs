//! Cart commands.
//!
//! Every invocation restores the persisted cart first, so line ids printed by
//! `cart show` can be fed straight back into `update` and `remove`.

use std::num::NonZeroU32;

use packon_core::{CartLineId, VariantId};
use packon_storefront::{AppError, CartStateManager};

use crate::context::Context;
use crate::display;

/// Show cart contents and totals.
pub async fn show(ctx: &Context) -> Result<String, AppError> {
    let manager = hydrated(ctx).await?;
    Ok(display::cart(&manager.snapshot()))
}

/// Add a variant by id.
pub async fn add(ctx: &Context, variant_id: String, quantity: u32) -> Result<String, AppError> {
    let quantity = positive(quantity)?;
    let manager = ctx.cart_manager();
    manager.add_item(VariantId::new(variant_id), quantity).await?;
    manager.open_cart();
    Ok(display::cart(&manager.snapshot()))
}

/// Set a line's quantity. Zero removes the line.
pub async fn update(ctx: &Context, line_id: String, quantity: u32) -> Result<String, AppError> {
    let manager = hydrated(ctx).await?;
    let line_id = CartLineId::new(line_id);
    match NonZeroU32::new(quantity) {
        Some(quantity) => manager.update_quantity(line_id, quantity).await?,
        None => manager.remove_item(line_id).await?,
    };
    Ok(display::cart(&manager.snapshot()))
}

/// Remove lines.
pub async fn remove(ctx: &Context, line_ids: Vec<String>) -> Result<String, AppError> {
    let manager = hydrated(ctx).await?;
    manager
        .remove_items(line_ids.into_iter().map(CartLineId::new).collect())
        .await?;
    Ok(display::cart(&manager.snapshot()))
}

/// Show the cart drawer.
pub async fn open(ctx: &Context) -> Result<String, AppError> {
    let manager = hydrated(ctx).await?;
    manager.open_cart();
    Ok(display::cart(&manager.snapshot()))
}

/// Print where to pay.
pub async fn checkout(ctx: &Context) -> Result<String, AppError> {
    let manager = hydrated(ctx).await?;
    match manager.checkout_url() {
        Some(url) if !manager.snapshot().is_empty() => Ok(url.to_string()),
        _ => Err(AppError::BadRequest("the cart is empty".to_string())),
    }
}

async fn hydrated(ctx: &Context) -> Result<CartStateManager, AppError> {
    let manager = ctx.cart_manager();
    manager.hydrate().await?;
    Ok(manager)
}

pub(crate) fn positive(quantity: u32) -> Result<NonZeroU32, AppError> {
    NonZeroU32::new(quantity)
        .ok_or_else(|| AppError::BadRequest("quantity must be at least 1".to_string()))
}
