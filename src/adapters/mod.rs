//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - axum REST endpoints
//! - `postgres` - sqlx repositories
//! - `stripe` - the payment provider gateway

pub mod http;
pub mod postgres;
pub mod stripe;
