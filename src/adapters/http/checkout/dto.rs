//! HTTP DTOs (Data Transfer Objects) for checkout endpoints.
//!
//! These types define the JSON structure at the boundary between HTTP
//! and the application layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::checkout::CompleteRedirectResult;
use crate::domain::foundation::OrderId;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query parameters of the success-redirect endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SuccessQuery {
    /// Provider session id substituted into the redirect URL.
    pub session_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body rendered by the success-redirect endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSuccessResponse {
    pub order_id: OrderId,
    /// Order total recorded on the payment receipt.
    pub amount: Decimal,
    /// False when the webhook had already fulfilled the order.
    pub newly_fulfilled: bool,
}

impl From<CompleteRedirectResult> for PaymentSuccessResponse {
    fn from(result: CompleteRedirectResult) -> Self {
        Self {
            order_id: result.order_id,
            amount: result.amount,
            newly_fulfilled: result.newly_fulfilled,
        }
    }
}

/// Body rendered by the cancel-redirect endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCancelResponse {
    pub status: String,
}

impl PaymentCancelResponse {
    pub fn canceled() -> Self {
        Self {
            status: "canceled".to_string(),
        }
    }
}

/// Acknowledgment body for accepted webhook deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
