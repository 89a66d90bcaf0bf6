//! Money conversion helpers.
//!
//! Order and payment amounts are exact decimals; the payment provider's
//! line items carry integer minor currency units (cents).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors converting a decimal amount to minor units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The amount has sub-cent precision and cannot be represented exactly.
    #[error("Amount {0} has sub-cent precision")]
    SubCentPrecision(Decimal),

    /// The amount is negative.
    #[error("Amount {0} is negative")]
    Negative(Decimal),

    /// The amount does not fit in an i64 of minor units.
    #[error("Amount {0} overflows minor units")]
    Overflow(Decimal),
}

/// Converts a decimal amount into integer minor units (cents).
///
/// The conversion is exact: `10.00` becomes `1000`, and an amount with
/// sub-cent precision (`9.999`) is rejected rather than rounded.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() {
        return Err(MoneyError::Negative(amount));
    }

    let scaled = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(MoneyError::Overflow(amount))?;

    if scaled.normalize().scale() != 0 {
        return Err(MoneyError::SubCentPrecision(amount));
    }

    scaled.to_i64().ok_or(MoneyError::Overflow(amount))
}
