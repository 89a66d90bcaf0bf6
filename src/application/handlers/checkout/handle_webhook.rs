//! HandleCheckoutWebhookHandler - Command handler for provider webhooks.
//!
//! The webhook path is a security boundary: the payload is verified
//! against the signing secret before anything else happens, and only a
//! `checkout.session.completed` event reaches the fulfillment applier.

use std::sync::Arc;

use crate::domain::checkout::{CheckoutError, CheckoutEvent};
use crate::domain::foundation::OrderId;
use crate::ports::{CheckoutGateway, OrderRepository};

use super::fulfill_order::{FulfillOrderCommand, FulfillOrderHandler, FulfillOrderResult};

/// Command to handle a provider webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleCheckoutWebhookCommand {
    /// Raw webhook payload.
    pub payload: Vec<u8>,
    /// Webhook signature header.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleCheckoutWebhookResult {
    /// Checkout completed; this delivery fulfilled the order.
    Fulfilled { order_id: OrderId },
    /// Checkout completed; the order had already been fulfilled
    /// (provider retry or redirect-back got there first).
    AlreadyFulfilled { order_id: OrderId },
    /// Event type we do not act on. Acknowledged so the provider stops
    /// redelivering.
    Ignored { event_type: String },
}

/// Handler for verified provider webhooks.
pub struct HandleCheckoutWebhookHandler {
    gateway: Arc<dyn CheckoutGateway>,
    fulfillment: FulfillOrderHandler,
}

impl HandleCheckoutWebhookHandler {
    pub fn new(gateway: Arc<dyn CheckoutGateway>, orders: Arc<dyn OrderRepository>) -> Self {
        Self {
            gateway,
            fulfillment: FulfillOrderHandler::new(orders),
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleCheckoutWebhookCommand,
    ) -> Result<HandleCheckoutWebhookResult, CheckoutError> {
        // 1. Authenticate before trusting a single byte of the payload
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Webhook rejected");
                err
            })?;

        // 2. Dispatch
        match event {
            CheckoutEvent::SessionCompleted(checkout) => {
                let result = self
                    .fulfillment
                    .handle(FulfillOrderCommand {
                        order_id: checkout.order_id,
                        transaction_id: checkout.transaction_id,
                        amount_total: checkout.amount_total,
                    })
                    .await?;

                Ok(match result {
                    FulfillOrderResult::Fulfilled { order_id, .. } => {
                        HandleCheckoutWebhookResult::Fulfilled { order_id }
                    }
                    FulfillOrderResult::AlreadyFulfilled { order_id, .. } => {
                        HandleCheckoutWebhookResult::AlreadyFulfilled { order_id }
                    }
                })
            }
            CheckoutEvent::Ignored { event_type } => {
                tracing::debug!(event_type = %event_type, "Webhook event ignored");
                Ok(HandleCheckoutWebhookResult::Ignored { event_type })
            }
        }
    }
}
