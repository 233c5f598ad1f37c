//! Cart conversions.

use std::collections::HashSet;
use std::num::NonZeroU32;

use packon_core::{CartId, CartLineId, VariantId};
use tracing::warn;
use url::Url;

use crate::shopify::ShopifyError;
use crate::shopify::types::{Cart, CartCost, CartLine, CartMerchandise, CartProduct};

use super::super::queries::{CartFields, CartLineFields, CartPayload, MerchandiseFields};
use super::{
    convert_money, convert_optional_image, convert_selected_options, invalid, join_user_errors,
};

/// Field path Shopify reports when the cart id does not resolve.
const CART_ID_FIELD: &str = "cartId";

/// Convert a cart record, checking line quantities and line uniqueness.
pub fn convert_cart(cart: CartFields) -> Result<Cart, ShopifyError> {
    let checkout_url = Url::parse(&cart.checkout_url)
        .map_err(|e| invalid(format_args!("checkout url {:?}: {e}", cart.checkout_url)))?;
    let total_quantity = u32::try_from(cart.total_quantity)
        .map_err(|_| invalid(format_args!("total quantity {}", cart.total_quantity)))?;

    let mut lines = Vec::with_capacity(cart.lines.edges.len());
    let mut seen = HashSet::new();
    for edge in cart.lines.edges {
        let Some(line) = convert_cart_line(edge.node)? else {
            continue;
        };
        if !seen.insert(line.merchandise.id.clone()) {
            return Err(invalid(format_args!(
                "cart has two lines for {}",
                line.merchandise.id
            )));
        }
        lines.push(line);
    }

    Ok(Cart {
        id: CartId::new(cart.id),
        checkout_url,
        total_quantity,
        cost: CartCost {
            subtotal: convert_money(cart.cost.subtotal_amount)?,
            total: convert_money(cart.cost.total_amount)?,
        },
        lines,
    })
}

/// Unwrap a cart mutation payload.
///
/// User errors win over a returned cart. A user error on `cartId`, or a
/// payload with neither cart nor errors, means the cart does not exist.
pub fn convert_cart_payload(
    payload: Option<CartPayload>,
    cart_id: Option<&str>,
) -> Result<Cart, ShopifyError> {
    let not_found = || ShopifyError::NotFound(format!("cart {}", cart_id.unwrap_or("(new)")));

    let Some(payload) = payload else {
        return Err(not_found());
    };

    if !payload.user_errors.is_empty() {
        let cart_missing = payload.user_errors.iter().any(|e| {
            e.field
                .as_deref()
                .is_some_and(|f| f.iter().any(|segment| segment == CART_ID_FIELD))
        });
        if cart_missing {
            return Err(not_found());
        }
        return Err(ShopifyError::UserError(join_user_errors(payload.user_errors)));
    }

    payload.cart.map_or_else(|| Err(not_found()), convert_cart)
}

fn convert_cart_line(line: CartLineFields) -> Result<Option<CartLine>, ShopifyError> {
    let MerchandiseFields::ProductVariant(variant) = line.merchandise else {
        warn!(line_id = %line.id, "Skipping cart line with non-variant merchandise");
        return Ok(None);
    };

    let quantity = u32::try_from(line.quantity)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| invalid(format_args!("line {} has quantity {}", line.id, line.quantity)))?;

    Ok(Some(CartLine {
        id: CartLineId::new(line.id),
        quantity,
        merchandise: CartMerchandise {
            id: VariantId::new(variant.id),
            title: variant.title,
            price: convert_money(variant.price)?,
            selected_options: convert_selected_options(variant.selected_options),
            product: CartProduct {
                title: variant.product.title,
                handle: variant.product.handle,
                image: convert_optional_image(variant.product.featured_image)?,
            },
        },
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn line_json(id: &str, variant: &str, quantity: i64) -> String {
        format!(
            r#"{{"node": {{
                "id": "{id}",
                "quantity": {quantity},
                "merchandise": {{
                    "__typename": "ProductVariant",
                    "id": "{variant}",
                    "title": "Default Title",
                    "selectedOptions": [{{"name": "Title", "value": "Default Title"}}],
                    "price": {{"amount": "0.50", "currencyCode": "BRL"}},
                    "product": {{"title": "Saco", "handle": "saco", "featuredImage": null}}
                }}
            }}}}"#
        )
    }

    fn cart_json(lines: &[String]) -> String {
        format!(
            r#"{{
                "id": "gid://shopify/Cart/c1",
                "checkoutUrl": "https://packon.com.br/cart/c/c1",
                "totalQuantity": 500,
                "cost": {{
                    "subtotalAmount": {{"amount": "250.00", "currencyCode": "BRL"}},
                    "totalAmount": {{"amount": "250.00", "currencyCode": "BRL"}}
                }},
                "lines": {{"edges": [{}]}}
            }}"#,
            lines.join(",")
        )
    }

    fn parse(json: &str) -> CartFields {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_convert_cart() {
        let cart = convert_cart(parse(&cart_json(&[line_json("l1", "v1", 500)]))).unwrap();
        assert_eq!(cart.id.as_str(), "gid://shopify/Cart/c1");
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity.get(), 500);
        assert_eq!(cart.lines[0].variant_label(), None);
        assert_eq!(cart.cost.total.display(), "R$250.00");
    }

    #[test]
    fn test_convert_cart_rejects_zero_quantity() {
        let err = convert_cart(parse(&cart_json(&[line_json("l1", "v1", 0)]))).unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidPayload(_)));
    }

    #[test]
    fn test_convert_cart_rejects_duplicate_variant_lines() {
        let json = cart_json(&[line_json("l1", "v1", 100), line_json("l2", "v1", 100)]);
        let err = convert_cart(parse(&json)).unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidPayload(_)));
    }

    #[test]
    fn test_payload_user_errors() {
        let payload: CartPayload = serde_json::from_str(
            r#"{"cart": null, "userErrors": [{"field": ["lines"], "message": "Sold out", "code": null}]}"#,
        )
        .unwrap();
        let err = convert_cart_payload(Some(payload), Some("c1")).unwrap_err();
        assert!(matches!(err, ShopifyError::UserError(ref m) if m == "Sold out"));
    }

    #[test]
    fn test_payload_cart_id_error_is_not_found() {
        let payload: CartPayload = serde_json::from_str(
            r#"{"cart": null, "userErrors": [{"field": ["cartId"], "message": "The specified cart does not exist.", "code": "INVALID"}]}"#,
        )
        .unwrap();
        let err = convert_cart_payload(Some(payload), Some("c1")).unwrap_err();
        assert!(matches!(err, ShopifyError::NotFound(_)));
    }

    #[test]
    fn test_payload_without_cart_is_not_found() {
        let err = convert_cart_payload(None, Some("c1")).unwrap_err();
        assert_eq!(err.to_string(), "Not found: cart c1");
    }
}
