//! Shipping estimate lookup.
//!
//! The storefront does not compute shipping. It asks an estimator for a
//! display string for a postal code and shows the answer verbatim.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;

/// Errors from shipping lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShippingError {
    #[error("invalid CEP {0:?}: expected 8 digits")]
    InvalidPostalCode(String),

    #[error("shipping lookup failed: {0}")]
    Lookup(String),
}

/// A Brazilian postal code (CEP), stored as its eight digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// The bare eight digits.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl FromStr for PostalCode {
    type Err = ShippingError;

    /// Accepts `12345678` or `12345-678`, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits: String = match trimmed.split_once('-') {
            Some((head, tail)) if head.len() == 5 && tail.len() == 3 => format!("{head}{tail}"),
            Some(_) => return Err(ShippingError::InvalidPostalCode(s.to_string())),
            None => trimmed.to_string(),
        };

        if digits.len() == 8 && digits.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(digits))
        } else {
            Err(ShippingError::InvalidPostalCode(s.to_string()))
        }
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (head, tail) = self.0.split_at(5);
        write!(f, "{head}-{tail}")
    }
}

/// Produces a display string for shipping to a postal code.
#[async_trait]
pub trait ShippingEstimator: Send + Sync {
    async fn estimate(&self, postal_code: &PostalCode) -> Result<String, ShippingError>;
}

/// Answers every postal code with the same configured message.
#[derive(Debug, Clone)]
pub struct StaticShippingEstimator {
    message: String,
}

impl StaticShippingEstimator {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ShippingEstimator for StaticShippingEstimator {
    #[instrument(skip(self), fields(cep = %postal_code))]
    async fn estimate(&self, postal_code: &PostalCode) -> Result<String, ShippingError> {
        Ok(self.message.clone())
    }
}
