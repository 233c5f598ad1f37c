//! Collection conversions.

use packon_core::VariantId;

use crate::shopify::ShopifyError;
use crate::shopify::types::{Collection, ProductSummary, VariantSummary};

use super::super::queries::{CollectionFields, ProductSummaryFields, get_collection_products};
use super::{convert_money, convert_nodes, convert_optional_image};

pub fn convert_collection(collection: CollectionFields) -> Result<Collection, ShopifyError> {
    Ok(Collection {
        handle: collection.handle,
        title: collection.title,
        image: convert_optional_image(collection.image)?,
    })
}

/// Convert a collection with its product grid.
pub fn convert_collection_products(
    collection: get_collection_products::CollectionWithProducts,
) -> Result<(Collection, Vec<ProductSummary>), ShopifyError> {
    let products = convert_nodes(collection.products, convert_product_summary)?;
    let collection = Collection {
        handle: collection.handle,
        title: collection.title,
        image: convert_optional_image(collection.image)?,
    };
    Ok((collection, products))
}

fn convert_product_summary(product: ProductSummaryFields) -> Result<ProductSummary, ShopifyError> {
    let first_variant = product
        .variants
        .edges
        .into_iter()
        .next()
        .map(|edge| VariantSummary {
            id: VariantId::new(edge.node.id),
            available_for_sale: edge.node.available_for_sale,
        });

    Ok(ProductSummary {
        handle: product.handle,
        title: product.title,
        min_price: convert_money(product.price_range.min_variant_price)?,
        image: convert_optional_image(product.featured_image)?,
        first_variant,
    })
}
