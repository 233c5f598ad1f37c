//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` 0.13 for HTTP.
//! Caches products and collections using `moka` (configurable TTL).

mod cache;
mod conversions;
mod gateway;

pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use packon_core::{CartId, CartLineId, Product};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdate, Collection, ProductSummary};
use crate::shopify::{GraphQLError, ShopifyError};

use cache::{CatalogCache, cached};
use conversions::{
    convert_cart, convert_cart_payload, convert_collection, convert_collection_products,
    convert_product,
};
use queries::{
    AddToCart, CreateCart, GetCart, GetCollectionProducts, GetCollections, GetProductByHandle,
    RemoveFromCart, UpdateCartLines, add_to_cart, create_cart, get_cart, get_collection_products,
    get_collections, get_product_by_handle, remove_from_cart, update_cart_lines,
};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";
const PRODUCT_IMAGE_COUNT: i64 = 10;
const PRODUCT_VARIANT_COUNT: i64 = 20;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides access to products, collections, and cart operations.
/// Catalog reads are cached; cart calls always hit the API.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    cache: CatalogCache,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ShopifyStorefrontConfig, cache_ttl: Duration) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint: config.endpoint(),
                access_token: config.storefront_token.clone(),
                cache: CatalogCache::new(cache_ttl),
            }),
        })
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                truncate(&response_text, 200)
            ))]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %truncate(&response_text, 500),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")])
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a product by its handle, with up to ten images and twenty variants.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown handle, or the API/validation error.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        cached(&self.inner.cache.products, handle.to_string(), || async {
            let variables = get_product_by_handle::Variables {
                handle: handle.to_string(),
                image_count: PRODUCT_IMAGE_COUNT,
                variant_count: PRODUCT_VARIANT_COUNT,
            };
            let data = self.execute::<GetProductByHandle>(variables).await?;
            let product = data
                .product
                .ok_or_else(|| ShopifyError::NotFound(format!("product {handle}")))?;
            convert_product(product)
        })
        .await
    }

    /// Get a collection and its first `first` products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown handle, or the API/validation error.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn collection_products(
        &self,
        handle: &str,
        first: i64,
    ) -> Result<(Collection, Vec<ProductSummary>), ShopifyError> {
        let key = (handle.to_string(), first);
        cached(&self.inner.cache.collection_products, key, || async {
            let variables = get_collection_products::Variables {
                handle: handle.to_string(),
                first,
            };
            let data = self.execute::<GetCollectionProducts>(variables).await?;
            let collection = data
                .collection
                .ok_or_else(|| ShopifyError::NotFound(format!("collection {handle}")))?;
            convert_collection_products(collection)
        })
        .await
    }

    /// List the first `first` collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn collections(&self, first: i64) -> Result<Vec<Collection>, ShopifyError> {
        cached(&self.inner.cache.collections, first, || async {
            let data = self
                .execute::<GetCollections>(get_collections::Variables { first })
                .await?;
            data.collections
                .edges
                .into_iter()
                .map(|edge| convert_collection(edge.node))
                .collect()
        })
        .await
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new, empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, ShopifyError> {
        let variables = create_cart::Variables {
            input: create_cart::CartInput::default(),
        };

        let data = self.execute::<CreateCart>(variables).await?;
        convert_cart_payload(data.cart_create, None)
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is not found or the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };

        let data = self.execute::<GetCart>(variables).await?;

        data.cart
            .ok_or_else(|| ShopifyError::NotFound(format!("cart {cart_id}")))
            .and_then(convert_cart)
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, line_count = lines.len()))]
    pub async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = add_to_cart::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self.execute::<AddToCart>(variables).await?;
        convert_cart_payload(data.cart_lines_add, Some(cart_id.as_str()))
    }

    /// Update cart line quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, line_count = lines.len()))]
    pub async fn update_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, ShopifyError> {
        let variables = update_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self.execute::<UpdateCartLines>(variables).await?;
        convert_cart_payload(data.cart_lines_update, Some(cart_id.as_str()))
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id, line_count = line_ids.len()))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        let variables = remove_from_cart::Variables {
            cart_id: cart_id.to_string(),
            line_ids: line_ids.into_iter().map(Into::into).collect(),
        };

        let data = self.execute::<RemoveFromCart>(variables).await?;
        convert_cart_payload(data.cart_lines_remove, Some(cart_id.as_str()))
    }
}

fn convert_graphql_error(error: graphql_client::Error) -> GraphQLError {
    let path = error.path.filter(|p| !p.is_empty()).map(|fragments| {
        fragments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    });
    let location = error.locations.and_then(|locations| {
        locations
            .first()
            .map(|l| (i64::from(l.line), i64::from(l.column)))
    });

    GraphQLError {
        message: error.message,
        path,
        location,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("embalagem", 3), "emb");
        assert_eq!(truncate("ção", 2), "çã");
        assert_eq!(truncate("ok", 10), "ok");
    }

    #[test]
    fn test_convert_graphql_error() {
        let error: graphql_client::Error = serde_json::from_str(
            r#"{"message": "Field 'x' doesn't exist", "locations": [{"line": 2, "column": 3}], "path": ["product", 0]}"#,
        )
        .unwrap();
        let converted = convert_graphql_error(error);
        assert_eq!(converted.location, Some((2, 3)));
        assert_eq!(converted.path.as_deref(), Some("product.0"));
    }
}
