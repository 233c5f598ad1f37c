//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Hand-written GraphQL documents, `graphql_client` request/response envelopes
//! - Shopify is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog responses (configurable TTL)
//! - Cart calls are never cached and surface through the
//!   [`CartGateway`](crate::cart::CartGateway) seam
//!
//! # Example
//!
//! ```rust,ignore
//! use packon_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.shopify, config.product_cache_ttl)?;
//!
//! // Get a product
//! let product = client.product_by_handle("sacos-stand-up").await?;
//!
//! // Create a cart and add the first variant
//! let cart = client.create_cart().await?;
//! let cart = client.add_to_cart(&cart.id, vec![CartLineInput {
//!     merchandise_id: product.variants[0].id.clone(),
//!     quantity: NonZeroU32::MIN,
//! }]).await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use types::*;

use std::fmt;

use thiserror::Error;

/// Errors that can occur when talking to the Storefront API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", join_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but violates the expected shape.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Throttled by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The mutation came back with `userErrors`.
    #[error("User error: {0}")]
    UserError(String),
}

impl ShopifyError {
    /// Whether the request never got a usable answer and may succeed if
    /// repeated unchanged.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::RateLimited(_))
    }
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLError {
    pub message: String,
    /// Response path, dot-joined (`cartLinesAdd.userErrors.0`).
    pub path: Option<String>,
    /// First source location as (line, column).
    pub location: Option<(i64, i64)>,
}

impl GraphQLError {
    /// An error carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            location: None,
        }
    }
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if !self.message.is_empty() {
            parts.push(self.message.clone());
        }
        if let Some(path) = &self.path {
            parts.push(format!("path: {path}"));
        }
        if let Some((line, column)) = self.location {
            parts.push(format!("at line {line}:{column}"));
        }

        if parts.is_empty() {
            f.write_str("(no details)")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

fn join_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ShopifyError::NotFound("cart gid://shopify/Cart/1".to_string());
        assert_eq!(err.to_string(), "Not found: cart gid://shopify/Cart/1");
    }

    #[test]
    fn test_graphql_errors_are_joined() {
        let err = ShopifyError::GraphQL(vec![
            GraphQLError::message("Field not found"),
            GraphQLError::message("Invalid ID"),
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_path_and_location() {
        let error = GraphQLError {
            message: String::new(),
            path: Some("cartLinesAdd.0".to_string()),
            location: Some((5, 10)),
        };
        assert_eq!(error.to_string(), "path: cartLinesAdd.0 at line 5:10");
    }

    #[test]
    fn test_graphql_error_without_details() {
        assert_eq!(GraphQLError::message("").to_string(), "(no details)");
        assert_eq!(
            ShopifyError::GraphQL(vec![]).to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_transient_errors() {
        assert!(ShopifyError::RateLimited(2).is_transient());
        assert!(!ShopifyError::UserError("Sold out".into()).is_transient());
        assert!(!ShopifyError::NotFound("cart".into()).is_transient());
    }
}
