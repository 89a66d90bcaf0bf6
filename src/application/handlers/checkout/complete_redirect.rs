//! CompleteRedirectHandler - Redirect-back from the hosted checkout.
//!
//! The provider sends the customer back with a `session_id` query
//! parameter; the session is retrieved to recover the order metadata and
//! transaction id, then fulfillment runs through the same idempotent
//! applier as the webhook path.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::checkout::CheckoutError;
use crate::domain::foundation::OrderId;
use crate::ports::{CheckoutGateway, OrderRepository};

use super::fulfill_order::{FulfillOrderCommand, FulfillOrderHandler, FulfillOrderResult};

/// Command carrying the session id from the success redirect.
#[derive(Debug, Clone)]
pub struct CompleteRedirectCommand {
    pub session_id: String,
}

/// Result of completing a redirect-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteRedirectResult {
    pub order_id: OrderId,
    /// Order total at fulfillment time.
    pub amount: Decimal,
    /// False when the webhook (or an earlier redirect) got there first.
    pub newly_fulfilled: bool,
}

/// Handler for the success-redirect endpoint.
pub struct CompleteRedirectHandler {
    gateway: Arc<dyn CheckoutGateway>,
    fulfillment: FulfillOrderHandler,
}

impl CompleteRedirectHandler {
    pub fn new(gateway: Arc<dyn CheckoutGateway>, orders: Arc<dyn OrderRepository>) -> Self {
        Self {
            gateway,
            fulfillment: FulfillOrderHandler::new(orders),
        }
    }

    pub async fn handle(
        &self,
        cmd: CompleteRedirectCommand,
    ) -> Result<CompleteRedirectResult, CheckoutError> {
        let session = self.gateway.retrieve_session(&cmd.session_id).await?;

        let result = self
            .fulfillment
            .handle(FulfillOrderCommand {
                order_id: session.order_id,
                transaction_id: session.transaction_id,
                amount_total: session.amount_total,
            })
            .await?;

        Ok(match result {
            FulfillOrderResult::Fulfilled { order_id, amount } => CompleteRedirectResult {
                order_id,
                amount,
                newly_fulfilled: true,
            },
            FulfillOrderResult::AlreadyFulfilled { order_id, amount } => CompleteRedirectResult {
                order_id,
                amount,
                newly_fulfilled: false,
            },
        })
    }
}
