//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends (the CLI) that captures
//! unexpected errors to Sentry before showing the shopper a short message.

use thiserror::Error;

use crate::cart::{CartError, StorageError};
use crate::config::ConfigError;
use crate::shipping::ShippingError;
use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Persisted cart identity could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Shipping estimate failed.
    #[error("Shipping error: {0}")]
    Shipping(#[from] ShippingError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error is worth an error report (not the shopper's doing).
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Shopify(_) | Self::Storage(_) | Self::Shipping(_)
        )
    }

    /// Capture reportable errors to Sentry and return the message to display.
    #[must_use]
    pub fn report(&self) -> String {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        }

        // Don't expose internal error details to shoppers
        match self {
            Self::Shopify(ShopifyError::NotFound(what)) => format!("Not found: {what}"),
            Self::Shopify(_) => "Store temporarily unavailable".to_string(),
            Self::Storage(_) => "Could not save the cart on this device".to_string(),
            Self::Cart(err) => err.kind().user_message().to_string(),
            _ => self.to_string(),
        }
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("variant_id", "gid://shopify/ProductVariant/1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("sacos-stand-up".to_string());
        assert_eq!(err.to_string(), "Not found: sacos-stand-up");

        let err = AppError::BadRequest("invalid CEP".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid CEP");
    }

    #[test]
    fn test_cart_errors_show_user_message() {
        let err = AppError::from(CartError::NetworkUnavailable("timeout".to_string()));
        assert!(!err.is_reportable());
        assert_eq!(
            err.report(),
            crate::cart::CartErrorKind::NetworkUnavailable.user_message()
        );
    }

    #[test]
    fn test_shopify_errors_hide_details() {
        let err = AppError::from(ShopifyError::UserError("internal detail".to_string()));
        assert!(err.is_reportable());
        assert_eq!(err.report(), "Store temporarily unavailable");
    }
}
