//! Error taxonomy for the checkout flow.

use thiserror::Error;

use crate::domain::foundation::{MoneyError, OrderId, ProductId};

use super::order::OrderStatus;
use super::webhook::WebhookError;

/// Errors that occur while building, fulfilling, or verifying a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Bad client input (non-numeric quantity, empty cart, mismatched
    /// form lists).
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Request shape is not a checkout form submission.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cart references a product that does not exist in the catalog.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// Fulfillment was requested for an unknown order.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// Fulfillment was requested for an order that cannot be paid.
    #[error("Order {order_id} cannot be fulfilled from status {status:?}")]
    InvalidState {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// The payment provider call failed. The order has been marked
    /// abandoned; the caller may start a fresh checkout.
    #[error("Payment provider error: {message}")]
    Provider { message: String, retryable: bool },

    /// Webhook authentication failed.
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// Database operation failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CheckoutError {
    /// Bad client input for a named field.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CheckoutError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Provider call failed; `retryable` marks transient transport faults.
    pub fn provider(message: impl Into<String>, retryable: bool) -> Self {
        CheckoutError::Provider {
            message: message.into(),
            retryable,
        }
    }

    /// Database operation failed.
    pub fn storage(message: impl Into<String>) -> Self {
        CheckoutError::Storage(message.into())
    }
}

impl From<MoneyError> for CheckoutError {
    fn from(err: MoneyError) -> Self {
        CheckoutError::validation("price", err.to_string())
    }
}
