//! Plain-text rendering of storefront state.

use packon_core::variants::OptionAvailability;
use packon_core::{AddTarget, Product, QuantityPicker, SelectionChange, VariantSelection};
use packon_storefront::CartSnapshot;
use packon_storefront::shopify::{Cart, Collection, ProductSummary};

/// Product page: option pills, current variant, price, add-to-cart state.
pub fn product(
    product: &Product,
    selection: &VariantSelection,
    picker: &QuantityPicker,
    clicks: &[(String, String, SelectionChange)],
) -> String {
    let mut out = vec![format!("{} ({})", product.title, product.handle)];

    for option in selection.options(product) {
        out.push(format!("  {}: {}", option.name, pills(&option)));
    }

    for (name, value, change) in clicks {
        let outcome = match change {
            SelectionChange::Resolved => "selected",
            SelectionChange::FellBack => "switched to first available",
            SelectionChange::Rejected => "unavailable, kept previous",
        };
        out.push(format!("  click {name}={value}: {outcome}"));
    }

    match selection.add_target(product) {
        AddTarget::Ready(variant) => {
            out.push(format!("Variant: {}  {}", variant.title, variant.price));
            out.push(format!("Quantity: {}", picker.value()));
            out.push("Ready to add".to_string());
        }
        AddTarget::Unavailable(variant) => {
            out.push(format!("Variant: {}  {}", variant.title, variant.price));
            out.push("Sold out".to_string());
        }
        AddTarget::NoVariant => out.push("No variant selected".to_string()),
    }

    if let Some(image) = selection.image() {
        out.push(format!("Image: {}", image.url));
    }

    out.join("\n")
}

/// `[Selected] Selectable (Disabled)`
fn pills(option: &OptionAvailability) -> String {
    option
        .values
        .iter()
        .map(|v| match (v.selected, v.selectable) {
            (true, _) => format!("[{}]", v.value),
            (false, true) => v.value.clone(),
            (false, false) => format!("({})", v.value),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cart drawer: lines, badge count, totals, last error.
pub fn cart(snapshot: &CartSnapshot) -> String {
    let mut out = Vec::new();
    if snapshot.is_open {
        out.push("== Carrinho ==".to_string());
    }

    match &snapshot.cart {
        Some(cart) if !cart.lines.is_empty() => out.extend(cart_lines(cart)),
        _ => out.push("Your cart is empty".to_string()),
    }

    if let Some(kind) = snapshot.last_error {
        out.push(format!("! {}", kind.user_message()));
    }

    out.join("\n")
}

fn cart_lines(cart: &Cart) -> Vec<String> {
    let mut out = Vec::with_capacity(cart.lines.len() + 3);
    for line in &cart.lines {
        let label = line
            .variant_label()
            .map_or_else(String::new, |label| format!(" - {label}"));
        out.push(format!(
            "{} x {}{}  @ {}  [{}]",
            line.quantity, line.merchandise.product.title, label, line.merchandise.price, line.id
        ));
    }
    out.push(format!("Items: {}", cart.item_count()));
    out.push(format!("Subtotal: {}", cart.cost.subtotal));
    out.push(format!("Total: {}", cart.cost.total));
    out
}

pub fn collections(collections: &[Collection]) -> String {
    if collections.is_empty() {
        return "No collections".to_string();
    }
    collections
        .iter()
        .map(|c| format!("{}  {}", c.handle, c.title))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn collection(collection: &Collection, products: &[ProductSummary]) -> String {
    let mut out = vec![collection.title.clone()];
    for product in products {
        let stock = match &product.first_variant {
            Some(v) if v.available_for_sale => "",
            Some(_) => "  (sold out)",
            None => "  (unavailable)",
        };
        out.push(format!(
            "  {}  {}  from {}{stock}",
            product.handle, product.title, product.min_price
        ));
    }
    out.join("\n")
}
