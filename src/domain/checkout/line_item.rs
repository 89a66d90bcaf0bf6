//! Priced line items submitted to the payment provider.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::to_minor_units;

use super::errors::CheckoutError;

/// A priced, named unit quantity for the provider's hosted checkout.
///
/// Independent of the internal order rows: the provider only sees a
/// display name, a unit amount in minor currency units, and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// ISO 4217 currency code, lowercase.
    pub currency: String,
    /// Display name shown on the hosted checkout page.
    pub name: String,
    /// Unit price in minor currency units (cents).
    pub unit_amount: i64,
    pub quantity: u32,
}

impl LineItem {
    /// Builds a line item from a catalog name/price and a validated
    /// quantity.
    ///
    /// # Errors
    ///
    /// `Validation` if the price cannot be represented exactly in minor
    /// units.
    pub fn priced(
        name: impl Into<String>,
        price: Decimal,
        quantity: u32,
        currency: &str,
    ) -> Result<Self, CheckoutError> {
        Ok(Self {
            currency: currency.to_string(),
            name: name.into(),
            unit_amount: to_minor_units(price)?,
            quantity,
        })
    }
}
