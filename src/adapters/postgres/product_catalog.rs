//! PostgreSQL implementation of ProductCatalog.
//!
//! The products table is owned by the storefront's catalog service; this
//! adapter only reads the fields needed to price a cart.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::checkout::CheckoutError;
use crate::domain::foundation::ProductId;
use crate::ports::{Product, ProductCatalog};

/// PostgreSQL implementation of the ProductCatalog port.
pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    /// Creates a new PgProductCatalog with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: Decimal,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            price: row.price,
        }
    }
}

#[async_trait]
impl ProductCatalog for PgProductCatalog {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, CheckoutError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, price
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CheckoutError::storage(format!("Failed to find product: {e}")))?;

        Ok(row.map(Product::from))
    }
}
