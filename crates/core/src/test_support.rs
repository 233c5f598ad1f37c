//! Product fixtures shared by the unit tests in this crate.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use url::Url;

use crate::types::{
    CurrencyCode, Image, Money, PriceRange, Product, ProductId, ProductOption, SelectedOptions,
    Variant, VariantId,
};

pub fn brl(cents: i64) -> Money {
    Money::new(Decimal::new(cents, 2), CurrencyCode::BRL)
}

pub fn image(path: &str) -> Image {
    Image {
        url: Url::parse(&format!("https://cdn.shopify.com/{path}")).unwrap(),
        alt_text: None,
    }
}

pub fn variant(id: &str, options: &[(&str, &str)], available: bool) -> Variant {
    let selected_options: SelectedOptions = options.iter().copied().collect();
    Variant {
        id: VariantId::new(id),
        title: selected_options.label(),
        selected_options,
        price: brl(1990),
        available_for_sale: available,
        image: None,
    }
}

pub fn product(options: &[(&str, &[&str])], variants: Vec<Variant>) -> Product {
    Product {
        id: ProductId::new("gid://shopify/Product/1"),
        handle: "pouch".to_owned(),
        title: "Pouch".to_owned(),
        description: String::new(),
        available_for_sale: variants.iter().any(|v| v.available_for_sale),
        options: options
            .iter()
            .map(|(name, values)| ProductOption {
                name: (*name).to_owned(),
                values: values.iter().map(|v| (*v).to_owned()).collect(),
            })
            .collect(),
        variants,
        images: vec![image("pouch.png")],
        price_range: PriceRange {
            min_variant_price: brl(1990),
            max_variant_price: brl(1990),
        },
    }
}

/// Thickness x Color pouch with one unavailable and one missing combination.
pub fn pouch() -> Product {
    product(
        &[("Thickness", &["Thin", "Thick"]), ("Color", &["Clear", "Black"])],
        vec![
            variant("thin-clear", &[("Thickness", "Thin"), ("Color", "Clear")], true),
            variant("thin-black", &[("Thickness", "Thin"), ("Color", "Black")], false),
            variant("thick-clear", &[("Thickness", "Thick"), ("Color", "Clear")], true),
        ],
    )
}

pub fn selection(pairs: &[(&str, &str)]) -> SelectedOptions {
    pairs.iter().copied().collect()
}
