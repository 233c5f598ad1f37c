//! Shipping estimate command.

use packon_storefront::shipping::{PostalCode, ShippingError};
use packon_storefront::{AppError, ShippingEstimator};

use crate::context::Context;

pub async fn estimate(ctx: &Context, cep: &str) -> Result<String, AppError> {
    let postal_code: PostalCode = cep
        .parse()
        .map_err(|e: ShippingError| AppError::BadRequest(e.to_string()))?;
    let message = ctx.shipping_estimator().estimate(&postal_code).await?;
    Ok(format!("{postal_code}: {message}"))
}
