pub mod movements;
pub mod products;
pub mod suppliers;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Money amounts: non-negative, whole cents
pub(crate) fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("decimal_min_zero");
        err.message = Some("must be greater than or equal to 0".into());
        return Err(err);
    }
    if value.normalize().scale() > 2 {
        let mut err = ValidationError::new("decimal_cents");
        err.message = Some("must have at most 2 decimal places".into());
        return Err(err);
    }
    Ok(())
}
