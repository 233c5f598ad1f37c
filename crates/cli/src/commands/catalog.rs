//! Catalog listing commands.

use packon_storefront::AppError;

use crate::context::Context;
use crate::display;

/// List collections.
pub async fn collections(ctx: &Context, first: i64) -> Result<String, AppError> {
    let collections = ctx.client.collections(first).await?;
    Ok(display::collections(&collections))
}

/// List the products in one collection.
pub async fn collection(ctx: &Context, handle: &str, first: i64) -> Result<String, AppError> {
    let (collection, products) = ctx.client.collection_products(handle, first).await?;
    Ok(display::collection(&collection, &products))
}
