//! PostgreSQL adapters - sqlx implementations of the persistence ports.

mod order_repository;
mod product_catalog;

pub use order_repository::PgOrderRepository;
pub use product_catalog::PgProductCatalog;
