//! Cart parsing and validation.
//!
//! Cart lines arrive from an HTML form as parallel `products` /
//! `quantities` text lists. Everything is validated here, before any
//! database write: quantities must be positive integers and product ids
//! well-formed UUIDs.

use crate::domain::foundation::ProductId;

use super::errors::CheckoutError;

/// A cart line as submitted, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCartLine {
    /// Product identifier, as text.
    pub product_id: String,
    /// Requested quantity, as text.
    pub quantity: String,
}

/// A validated cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartLine {
    /// Validates a raw line.
    ///
    /// # Errors
    ///
    /// `Validation` if the product id is not a UUID or the quantity is
    /// not a positive integer.
    pub fn parse(raw: &RawCartLine) -> Result<Self, CheckoutError> {
        let product_id: ProductId = raw
            .product_id
            .trim()
            .parse()
            .map_err(|_| CheckoutError::validation("product", "not a valid product id"))?;

        let quantity: u32 = raw.quantity.trim().parse().map_err(|_| {
            CheckoutError::validation("quantity", "must be a positive integer")
        })?;

        if quantity == 0 {
            return Err(CheckoutError::validation(
                "quantity",
                "must be a positive integer",
            ));
        }

        Ok(Self {
            product_id,
            quantity,
        })
    }
}

/// A validated, non-empty cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Validates a full cart submission, all-or-nothing.
    ///
    /// # Errors
    ///
    /// `Validation` if the cart is empty or any line fails to parse. No
    /// partially-validated cart is ever produced.
    pub fn parse(raw_lines: &[RawCartLine]) -> Result<Self, CheckoutError> {
        if raw_lines.is_empty() {
            return Err(CheckoutError::validation("products", "cart is empty"));
        }

        let lines = raw_lines
            .iter()
            .map(CartLine::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { lines })
    }

    /// Pairs the `products` and `quantities` form lists into raw lines.
    ///
    /// # Errors
    ///
    /// `Validation` if the lists have different lengths.
    pub fn pair_form_lists(
        products: Vec<String>,
        quantities: Vec<String>,
    ) -> Result<Vec<RawCartLine>, CheckoutError> {
        if products.len() != quantities.len() {
            return Err(CheckoutError::validation(
                "quantities",
                format!(
                    "{} products but {} quantities",
                    products.len(),
                    quantities.len()
                ),
            ));
        }

        Ok(products
            .into_iter()
            .zip(quantities)
            .map(|(product_id, quantity)| RawCartLine {
                product_id,
                quantity,
            })
            .collect())
    }

    /// The validated lines.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }
}
