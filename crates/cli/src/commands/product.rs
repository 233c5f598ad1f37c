//! Product page command.
//!
//! Loads a product, starts a [`VariantSelection`], replays option clicks in
//! the order given, and optionally adds the result to the cart.

use clap::Args;
use packon_core::{AddTarget, VariantId, VariantSelection};
use packon_storefront::{AppError, add_breadcrumb};
use thiserror::Error;

use crate::context::Context;
use crate::display;

#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Product handle
    pub handle: String,

    /// Start on this variant instead of the first available one
    #[arg(long)]
    pub variant: Option<String>,

    /// Option click, applied in order (e.g. --select Cor=Kraft)
    #[arg(long = "select", value_name = "NAME=VALUE", value_parser = parse_click)]
    pub clicks: Vec<(String, String)>,

    /// Quantity picker "+" presses
    #[arg(long, default_value_t = 0)]
    pub increase: u32,

    /// Quantity picker "-" presses
    #[arg(long, default_value_t = 0)]
    pub decrease: u32,

    /// Add the selected variant to the cart
    #[arg(long)]
    pub add: bool,
}

#[derive(Debug, Error)]
#[error("expected NAME=VALUE, got {0:?}")]
pub struct ClickParseError(String);

fn parse_click(raw: &str) -> Result<(String, String), ClickParseError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ClickParseError(raw.to_string())),
    }
}

pub async fn show(ctx: &Context, args: ProductArgs) -> Result<String, AppError> {
    let product = ctx.client.product_by_handle(&args.handle).await?;
    add_breadcrumb(
        "navigation",
        "Viewed product",
        Some(&[("handle", product.handle.as_str())]),
    );

    let requested = args.variant.map(VariantId::new);
    let mut selection = VariantSelection::new(&product, requested.as_ref());

    let mut clicks = Vec::with_capacity(args.clicks.len());
    for (name, value) in args.clicks {
        let change = selection.choose(&product, &name, &value);
        clicks.push((name, value, change));
    }

    let mut picker = ctx.quantity_picker();
    for _ in 0..args.increase {
        picker.increment();
    }
    for _ in 0..args.decrease {
        picker.decrement();
    }

    let mut output = display::product(&product, &selection, &picker, &clicks);

    if args.add {
        let variant = match selection.add_target(&product) {
            AddTarget::Ready(variant) => variant,
            AddTarget::Unavailable(variant) => {
                return Err(AppError::BadRequest(format!("{} is sold out", variant.title)));
            }
            AddTarget::NoVariant => {
                return Err(AppError::BadRequest("no variant selected".to_string()));
            }
        };

        let manager = ctx.cart_manager();
        manager.add_item(variant.id.clone(), picker.value()).await?;
        manager.open_cart();
        output.push_str("\n\n");
        output.push_str(&display::cart(&manager.snapshot()));
    }

    Ok(output)
}
