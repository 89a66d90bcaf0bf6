//! HTTP adapters - REST API implementations.

pub mod checkout;

// Re-export key types for convenience
pub use checkout::checkout_router;
pub use checkout::CheckoutAppState;
