//! Product conversions.

use packon_core::{
    PriceRange, Product, ProductId, ProductOption, SelectedOption, SelectedOptions, Variant,
    VariantId,
};

use crate::shopify::ShopifyError;

use super::super::queries::{ProductFields, SelectedOptionFields, VariantFields};
use super::{convert_image, convert_money, convert_nodes, convert_optional_image, invalid};

/// Convert a full product record.
///
/// Every variant must pick exactly one declared value per product option,
/// and no two variants may pick the same combination.
pub fn convert_product(product: ProductFields) -> Result<Product, ShopifyError> {
    let options: Vec<ProductOption> = product
        .options
        .into_iter()
        .map(|o| ProductOption {
            name: o.name,
            values: o.values,
        })
        .collect();
    let variants = convert_nodes(product.variants, |v| convert_variant(&options, v))?;

    for (i, variant) in variants.iter().enumerate() {
        if let Some(twin) = variants
            .iter()
            .take(i)
            .find(|other| other.selected_options == variant.selected_options)
        {
            return Err(invalid(format_args!(
                "variants {} and {} select the same options",
                twin.id, variant.id
            )));
        }
    }

    Ok(Product {
        id: ProductId::new(product.id),
        handle: product.handle,
        title: product.title,
        description: product.description,
        available_for_sale: product.available_for_sale,
        options,
        price_range: PriceRange {
            min_variant_price: convert_money(product.price_range.min_variant_price)?,
            max_variant_price: convert_money(product.price_range.max_variant_price)?,
        },
        images: convert_nodes(product.images, convert_image)?,
        variants,
    })
}

fn convert_variant(
    options: &[ProductOption],
    variant: VariantFields,
) -> Result<Variant, ShopifyError> {
    let selected_options =
        order_selected_options(options, &variant.id, &variant.selected_options)?;
    Ok(Variant {
        id: VariantId::new(variant.id),
        title: variant.title,
        selected_options,
        price: convert_money(variant.price)?,
        available_for_sale: variant.available_for_sale,
        image: convert_optional_image(variant.image)?,
    })
}

/// Rebuild a variant's options in product option order.
fn order_selected_options(
    options: &[ProductOption],
    variant_id: &str,
    selected: &[SelectedOptionFields],
) -> Result<SelectedOptions, ShopifyError> {
    if let Some(extra) = selected
        .iter()
        .find(|s| !options.iter().any(|o| o.name == s.name))
    {
        return Err(invalid(format_args!(
            "variant {variant_id} selects unknown option {:?}",
            extra.name
        )));
    }

    options
        .iter()
        .map(|option| {
            let mut picks = selected.iter().filter(|s| s.name == option.name);
            let value = match (picks.next(), picks.next()) {
                (Some(pick), None) => &pick.value,
                (None, _) => {
                    return Err(invalid(format_args!(
                        "variant {variant_id} has no {:?} option",
                        option.name
                    )));
                }
                (Some(_), Some(_)) => {
                    return Err(invalid(format_args!(
                        "variant {variant_id} selects {:?} more than once",
                        option.name
                    )));
                }
            };
            if !option.values.contains(value) {
                return Err(invalid(format_args!(
                    "variant {variant_id} selects undeclared {:?} value {value:?}",
                    option.name
                )));
            }
            Ok(SelectedOption::new(option.name.clone(), value.clone()))
        })
        .collect()
}
