//! Catalog read cache.
//!
//! One typed `moka` cache per read so a hit never needs a variant check.
//! Cart reads are never cached.

use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use moka::future::Cache;
use packon_core::Product;
use tracing::debug;

use crate::shopify::ShopifyError;
use crate::shopify::types::{Collection, ProductSummary};

const MAX_ENTRIES: u64 = 1000;

pub struct CatalogCache {
    pub products: Cache<String, Product>,
    pub collection_products: Cache<(String, i64), (Collection, Vec<ProductSummary>)>,
    pub collections: Cache<i64, Vec<Collection>>,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            products: build(ttl),
            collection_products: build(ttl),
            collections: build(ttl),
        }
    }
}

fn build<K, V>(ttl: Duration) -> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(MAX_ENTRIES)
        .time_to_live(ttl)
        .build()
}

/// Return the cached value for `key`, or fetch and cache it. Failed fetches
/// are not cached.
pub async fn cached<K, V, F, Fut>(cache: &Cache<K, V>, key: K, fetch: F) -> Result<V, ShopifyError>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, ShopifyError>>,
{
    if let Some(hit) = cache.get(&key).await {
        debug!("Catalog cache hit");
        return Ok(hit);
    }

    let value = fetch().await?;
    cache.insert(key, value.clone()).await;
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let cache: Cache<i64, Vec<Collection>> = build(Duration::from_secs(60));

        let first = cached(&cache, 1, || async { Ok(Vec::new()) }).await.unwrap();
        let second = cached(&cache, 1, || async {
            Err(ShopifyError::NotFound("should not be fetched".into()))
        })
        .await
        .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache: Cache<i64, Vec<Collection>> = build(Duration::from_secs(60));

        let failed = cached(&cache, 1, || async { Err(ShopifyError::RateLimited(1)) }).await;
        assert!(failed.is_err());

        let retried = cached(&cache, 1, || async { Ok(Vec::new()) }).await;
        assert!(retried.is_ok());
    }
}
