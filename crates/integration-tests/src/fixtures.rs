//! Catalog fixtures.

use packon_core::{
    CurrencyCode, Money, PriceRange, Product, ProductId, ProductOption, SelectedOptions, Variant,
    VariantId,
};
use rust_decimal::Decimal;

/// Build a variant whose title is its option values.
pub fn variant(id: &str, options: &[(&str, &str)], available: bool) -> Variant {
    let selected_options: SelectedOptions = options.iter().copied().collect();
    Variant {
        id: VariantId::new(id),
        title: selected_options.label(),
        selected_options,
        price: Money::new(Decimal::new(1990, 2), CurrencyCode::BRL),
        available_for_sale: available,
        image: None,
    }
}

/// Build a product from declared options and its variants.
pub fn product(handle: &str, options: &[(&str, &[&str])], variants: Vec<Variant>) -> Product {
    let price = Money::new(Decimal::new(1990, 2), CurrencyCode::BRL);
    Product {
        id: ProductId::new(format!("gid://shopify/Product/{handle}")),
        handle: handle.to_owned(),
        title: handle.to_owned(),
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
        images: Vec::new(),
        price_range: PriceRange {
            min_variant_price: price,
            max_variant_price: price,
        },
    }
}

/// Thickness x Color pouch: (Thin, Clear) available, (Thin, Black) sold out,
/// (Thick, Clear) available, (Thick, Black) never made.
pub fn pouch() -> Product {
    product(
        "pouch",
        &[("Thickness", &["Thin", "Thick"]), ("Color", &["Clear", "Black"])],
        vec![
            variant("thin-clear", &[("Thickness", "Thin"), ("Color", "Clear")], true),
            variant("thin-black", &[("Thickness", "Thin"), ("Color", "Black")], false),
            variant("thick-clear", &[("Thickness", "Thick"), ("Color", "Clear")], true),
        ],
    )
}

/// Three options, sparse variants, mixed availability.
pub fn stand_up_bag() -> Product {
    let sizes: &[&str] = &["10x15", "15x20", "20x30"];
    let finishes: &[&str] = &["Fosco", "Brilho"];
    let valves: &[&str] = &["Com valvula", "Sem valvula"];

    let mut variants = Vec::new();
    let mut n = 0_usize;
    for size in sizes {
        for finish in finishes {
            for valve in valves {
                n += 1;
                // Every third combination is never made, every fourth sold out.
                if n % 3 == 0 {
                    continue;
                }
                variants.push(variant(
                    &format!("bag-{n}"),
                    &[("Tamanho", size), ("Acabamento", finish), ("Valvula", valve)],
                    n % 4 != 0,
                ));
            }
        }
    }

    product(
        "stand-up-bag",
        &[("Tamanho", sizes), ("Acabamento", finishes), ("Valvula", valves)],
        variants,
    )
}

/// Every complete selection drawn from `product`'s declared option values.
pub fn complete_selections(product: &Product) -> Vec<SelectedOptions> {
    product.options.iter().fold(vec![SelectedOptions::new()], |acc, option| {
        acc.iter()
            .flat_map(|partial| {
                option.values.iter().map(move |value| {
                    let mut next = partial.clone();
                    next.set(option.name.clone(), value.clone());
                    next
                })
            })
            .collect()
    })
}
