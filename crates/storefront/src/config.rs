//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., packon-loja.myshopify.com)
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API access token
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)
//! - `SHOPIFY_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `PACKON_PRODUCT_CACHE_TTL_SECS` - Catalog cache TTL (default: 300)
//! - `PACKON_CART_STORE_PATH` - Persisted cart identity file (default: .packon/cart.json)
//! - `PACKON_QUANTITY_STEP` - Quantity picker step (default: 100)
//! - `PACKON_QUANTITY_MIN` - Quantity picker minimum (default: 100)
//! - `PACKON_QUANTITY_DEFAULT` - Quantity picker initial value (default: 500)
//! - `PACKON_SHIPPING_MESSAGE` - Shipping estimate shown verbatim
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_SHIPPING_MESSAGE: &str = "Frete Grátis - Chega em 3 dias";

/// Substrings that mark a token copied from a template (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "placeholder",
    "example",
    "token-here",
    "xxx",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Catalog cache TTL
    pub product_cache_ttl: Duration,
    /// File holding the persisted cart identity
    pub cart_store_path: PathBuf,
    /// Quantity picker defaults
    pub quantity: QuantityConfig,
    /// Shipping estimate shown verbatim
    pub shipping_message: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., packon-loja.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2024-01)
    pub api_version: String,
    /// Storefront API access token
    pub storefront_token: SecretString,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_token", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// GraphQL endpoint for this store and API version.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("https://{}/api/{}/graphql.json", self.store, self.api_version)
    }
}

/// Quantity picker defaults (packaging is sold in lots).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityConfig {
    pub step: NonZeroU32,
    pub min: NonZeroU32,
    pub initial: NonZeroU32,
}

impl Default for QuantityConfig {
    fn default() -> Self {
        Self {
            step: NonZeroU32::new(100).unwrap_or(NonZeroU32::MIN),
            min: NonZeroU32::new(100).unwrap_or(NonZeroU32::MIN),
            initial: NonZeroU32::new(500).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the access token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::load(&Vars(&ProcessEnv))
    }

    fn load<S: Source>(vars: &Vars<'_, S>) -> Result<Self, ConfigError> {
        Ok(Self {
            shopify: ShopifyStorefrontConfig::load(vars)?,
            product_cache_ttl: Duration::from_secs(
                vars.parsed_or("PACKON_PRODUCT_CACHE_TTL_SECS", 300)?,
            ),
            cart_store_path: PathBuf::from(vars.or("PACKON_CART_STORE_PATH", ".packon/cart.json")),
            quantity: QuantityConfig::load(vars)?,
            shipping_message: vars.or("PACKON_SHIPPING_MESSAGE", DEFAULT_SHIPPING_MESSAGE),
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ShopifyStorefrontConfig {
    fn load<S: Source>(vars: &Vars<'_, S>) -> Result<Self, ConfigError> {
        let store = vars.required("SHOPIFY_STORE")?;
        validate_store_domain(&store, "SHOPIFY_STORE")?;

        let token = vars.required("SHOPIFY_STOREFRONT_TOKEN")?;
        validate_secret_strength(&token, "SHOPIFY_STOREFRONT_TOKEN")?;

        Ok(Self {
            store,
            api_version: vars.or("SHOPIFY_API_VERSION", "2024-01"),
            storefront_token: SecretString::from(token),
            request_timeout: Duration::from_secs(vars.parsed_or("SHOPIFY_REQUEST_TIMEOUT_SECS", 10)?),
        })
    }
}

impl QuantityConfig {
    fn load<S: Source>(vars: &Vars<'_, S>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            step: vars.parsed_or("PACKON_QUANTITY_STEP", defaults.step)?,
            min: vars.parsed_or("PACKON_QUANTITY_MIN", defaults.min)?,
            initial: vars.parsed_or("PACKON_QUANTITY_DEFAULT", defaults.initial)?,
        })
    }
}

// =============================================================================
// Variable Lookup
// =============================================================================

/// Where variables come from. Empty values count as unset.
trait Source {
    fn get(&self, key: &str) -> Option<String>;
}

struct ProcessEnv;

impl Source for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

struct Vars<'a, S>(&'a S);

impl<S: Source> Vars<'_, S> {
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.0
            .get(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.0.get(key)
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.0.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.0.get(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

// =============================================================================
// Validation
// =============================================================================

/// The store must be a bare domain: the endpoint adds the scheme and path.
fn validate_store_domain(store: &str, var_name: &str) -> Result<(), ConfigError> {
    if store.contains("://") || store.contains('/') {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "expected a bare domain without scheme or trailing slash".to_string(),
        ));
    }
    Ok(())
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: BTreeMap<char, u32> = BTreeMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&count| {
            let p = f64::from(count) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder tokens and tokens too uniform to be issued by Shopify.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("looks like a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}); use the token from the Headless channel"
            ),
        ));
    }
    Ok(())
}
