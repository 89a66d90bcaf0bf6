//! Checkout gateway port for the external payment provider.
//!
//! Defines the contract for hosted-checkout integrations (e.g., Stripe).
//! The provider owns the actual payment processing; this port only covers
//! session creation, session retrieval, and webhook verification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::checkout::{CheckoutError, CheckoutEvent, LineItem, WebhookError};
use crate::domain::foundation::OrderId;

/// Request to create a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Priced line items for the hosted page.
    pub line_items: Vec<LineItem>,

    /// Our order, carried in the session metadata so the asynchronous
    /// webhook can be correlated back.
    pub order_id: OrderId,

    /// URL the provider redirects to after successful payment. Carries
    /// the provider's session-id placeholder.
    pub success_url: String,

    /// URL the provider redirects to when the customer backs out.
    pub cancel_url: String,
}

/// A created hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedCheckout {
    /// Provider's session id.
    pub id: String,

    /// URL for the customer to complete checkout.
    pub url: String,
}

/// Details of an existing session, fetched on redirect-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    /// Provider's session id.
    pub id: String,

    /// Our order, recovered from the session metadata.
    pub order_id: OrderId,

    /// Provider transaction identifier (payment intent), present once
    /// payment has been taken.
    pub transaction_id: Option<String>,

    /// Total the provider charged, in minor currency units.
    pub amount_total: Option<i64>,
}

/// Port for the hosted-checkout payment provider.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Creates a hosted checkout session for a one-time payment.
    ///
    /// Returns the URL to redirect the customer to.
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<HostedCheckout, CheckoutError>;

    /// Retrieves an existing session by id (redirect-back path).
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails, CheckoutError>;

    /// Verifies a webhook signature and parses the event.
    ///
    /// Returns the typed event if valid; an unverified payload never
    /// reaches fulfillment.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<CheckoutEvent, WebhookError>;
}
