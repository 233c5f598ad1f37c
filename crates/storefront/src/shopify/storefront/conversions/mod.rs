//! Wire record to domain type conversions.
//!
//! Every conversion validates shape once (decimal amounts, known currencies,
//! absolute URLs, positive quantities, variant options against the product's
//! own) and fails with [`ShopifyError::InvalidPayload`] instead of passing
//! half-parsed data on.

pub mod cart;
pub mod collections;
pub mod products;

use std::str::FromStr;

use packon_core::{CurrencyCode, Image, Money, SelectedOption, SelectedOptions};
use rust_decimal::Decimal;
use url::Url;

use crate::shopify::ShopifyError;

use super::queries::{Connection, ImageFields, MoneyFields, SelectedOptionFields, UserErrorFields};

pub use cart::{convert_cart, convert_cart_payload};
pub use collections::{convert_collection, convert_collection_products};
pub use products::convert_product;

fn invalid(what: impl std::fmt::Display) -> ShopifyError {
    ShopifyError::InvalidPayload(what.to_string())
}

fn convert_money(money: MoneyFields) -> Result<Money, ShopifyError> {
    let amount = Decimal::from_str(&money.amount)
        .map_err(|e| invalid(format_args!("amount {:?}: {e}", money.amount)))?;
    let currency_code = CurrencyCode::from_str(&money.currency_code).map_err(invalid)?;
    Ok(Money::new(amount, currency_code))
}

fn convert_image(image: ImageFields) -> Result<Image, ShopifyError> {
    let url = Url::parse(&image.url)
        .map_err(|e| invalid(format_args!("image url {:?}: {e}", image.url)))?;
    Ok(Image {
        url,
        alt_text: image.alt_text,
    })
}

fn convert_optional_image(image: Option<ImageFields>) -> Result<Option<Image>, ShopifyError> {
    image.map(convert_image).transpose()
}

fn convert_selected_options(options: Vec<SelectedOptionFields>) -> SelectedOptions {
    options
        .into_iter()
        .map(|o| SelectedOption::new(o.name, o.value))
        .collect()
}

/// Flatten `edges { node }`, converting each node.
fn convert_nodes<T, U>(
    connection: Connection<T>,
    convert: impl FnMut(T) -> Result<U, ShopifyError>,
) -> Result<Vec<U>, ShopifyError> {
    connection.edges.into_iter().map(|e| e.node).map(convert).collect()
}

/// Join mutation user errors into one message.
fn join_user_errors(errors: Vec<UserErrorFields>) -> String {
    errors
        .into_iter()
        .map(|e| match (e.code, e.field) {
            (Some(code), Some(field)) => format!("{} ({code} on {})", e.message, field.join(".")),
            (Some(code), None) => format!("{} ({code})", e.message),
            (None, _) => e.message,
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(amount: &str, currency: &str) -> MoneyFields {
        MoneyFields {
            amount: amount.to_string(),
            currency_code: currency.to_string(),
        }
    }

    #[test]
    fn test_convert_money() {
        let converted = convert_money(money("12.5", "BRL")).unwrap();
        assert_eq!(converted.display(), "R$12.50");
    }

    #[test]
    fn test_convert_money_rejects_bad_amount() {
        let err = convert_money(money("twelve", "BRL")).unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidPayload(_)));
    }

    #[test]
    fn test_convert_money_rejects_unknown_currency() {
        let err = convert_money(money("1.00", "JPY")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid payload: unsupported currency code: JPY"
        );
    }

    #[test]
    fn test_convert_image_rejects_relative_url() {
        let err = convert_image(ImageFields {
            url: "/files/pouch.png".to_string(),
            alt_text: None,
        })
        .unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidPayload(_)));
    }

    #[test]
    fn test_join_user_errors() {
        let message = join_user_errors(vec![
            UserErrorFields {
                field: Some(vec!["lines".to_string(), "0".to_string()]),
                message: "Merchandise not found".to_string(),
                code: Some("INVALID".to_string()),
            },
            UserErrorFields {
                field: None,
                message: "Cart is locked".to_string(),
                code: None,
            },
        ]);
        assert_eq!(
            message,
            "Merchandise not found (INVALID on lines.0); Cart is locked"
        );
    }
}
