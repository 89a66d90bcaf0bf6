//! Product catalog port.
//!
//! The catalog is owned by the surrounding storefront; this flow only
//! reads the fields it needs to price a cart.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::checkout::CheckoutError;
use crate::domain::foundation::ProductId;

/// Catalog product, read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Display name shown on the hosted checkout page.
    pub name: String,
    /// Current catalog price.
    pub price: Decimal,
}

/// Port for read-only product lookups.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Looks up a product by id. `None` if the id is unknown.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, CheckoutError>;
}
