//! Provider webhook event types.
//!
//! `ProviderEvent` is the wire shape of a webhook payload; only fields
//! relevant to our processing are captured. `CheckoutEvent` is the typed
//! view handed to the application layer: the one event type that triggers
//! fulfillment, and an explicit ignored variant for everything else.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::OrderId;

use super::webhook::WebhookError;

/// Event type string that triggers fulfillment.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Provider webhook event (simplified wire shape).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: ProviderEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEventData {
    /// The object that triggered the event (polymorphic per event type).
    pub object: serde_json::Value,
}

/// Checkout session object carried by a `checkout.session.completed` event.
#[derive(Debug, Clone, Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    payment_intent: Option<String>,
    amount_total: Option<i64>,
}

/// A completed hosted checkout, correlated back to our order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    /// Provider's checkout session id.
    pub session_id: String,
    /// Our order, recovered from the session metadata.
    pub order_id: OrderId,
    /// Provider transaction identifier (payment intent).
    pub transaction_id: Option<String>,
    /// Total the provider charged, in minor currency units.
    pub amount_total: Option<i64>,
}

/// Typed view of a verified webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// The hosted checkout completed; fulfillment may proceed.
    SessionCompleted(CompletedCheckout),
    /// Any other event type. Accepted and acknowledged, never acted on.
    Ignored { event_type: String },
}

impl ProviderEvent {
    /// Narrows the wire event into the typed view.
    ///
    /// # Errors
    ///
    /// For `checkout.session.completed` events only:
    /// `InvalidPayload` if the session object does not deserialize, and
    /// `MissingMetadata` if the session carries no usable `order_id`.
    pub fn into_checkout_event(self) -> Result<CheckoutEvent, WebhookError> {
        if self.event_type != CHECKOUT_SESSION_COMPLETED {
            return Ok(CheckoutEvent::Ignored {
                event_type: self.event_type,
            });
        }

        let session: SessionObject = serde_json::from_value(self.data.object)
            .map_err(|e| WebhookError::InvalidPayload(format!("invalid session object: {e}")))?;

        let order_id = session
            .metadata
            .get("order_id")
            .ok_or(WebhookError::MissingMetadata("order_id"))?
            .parse::<OrderId>()
            .map_err(|_| WebhookError::MissingMetadata("order_id"))?;

        Ok(CheckoutEvent::SessionCompleted(CompletedCheckout {
            session_id: session.id,
            order_id,
            transaction_id: session.payment_intent,
            amount_total: session.amount_total,
        }))
    }
}
