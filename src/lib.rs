//! Storefront Checkout - hosted checkout and payment fulfillment service.
//!
//! Creates hosted checkout sessions through the payment provider, handles
//! redirect callbacks, and verifies asynchronous webhook notifications to
//! mark orders paid.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
