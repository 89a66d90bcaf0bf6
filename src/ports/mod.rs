//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `OrderRepository` - persistence for orders, items, and payments
//! - `ProductCatalog` - read-only access to the product catalog
//! - `CheckoutGateway` - the external payment provider

mod checkout_gateway;
mod order_repository;
mod product_catalog;

pub use checkout_gateway::{CheckoutGateway, CreateSessionRequest, HostedCheckout, SessionDetails};
pub use order_repository::OrderRepository;
pub use product_catalog::{Product, ProductCatalog};
