//! FulfillOrderHandler - Idempotent order fulfillment.
//!
//! Invoked from two independent triggers - the redirect-back handler and
//! the webhook handler - possibly concurrently for the same order. The
//! repository's conditional paid transition decides a single winner; the
//! loser observes `AlreadyFulfilled` and no second Payment is created.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::checkout::{total_cost, CheckoutError, NewPayment, OrderStatus};
use crate::domain::foundation::{to_minor_units, OrderId};
use crate::ports::OrderRepository;

/// Command to fulfill an order after the provider reported payment.
#[derive(Debug, Clone)]
pub struct FulfillOrderCommand {
    pub order_id: OrderId,
    /// Provider transaction identifier (payment intent).
    pub transaction_id: Option<String>,
    /// Total the provider reports having charged, in minor units.
    pub amount_total: Option<i64>,
}

/// Result of a fulfillment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillOrderResult {
    /// This call transitioned the order to paid and recorded the receipt.
    Fulfilled { order_id: OrderId, amount: Decimal },
    /// The order was already paid; nothing was changed.
    AlreadyFulfilled { order_id: OrderId, amount: Decimal },
}

impl FulfillOrderResult {
    /// The order total, regardless of which caller fulfilled it.
    pub fn amount(&self) -> Decimal {
        match self {
            FulfillOrderResult::Fulfilled { amount, .. }
            | FulfillOrderResult::AlreadyFulfilled { amount, .. } => *amount,
        }
    }

    /// The order this result refers to.
    pub fn order_id(&self) -> OrderId {
        match self {
            FulfillOrderResult::Fulfilled { order_id, .. }
            | FulfillOrderResult::AlreadyFulfilled { order_id, .. } => *order_id,
        }
    }
}

/// Handler that marks an order paid and records its payment receipt.
pub struct FulfillOrderHandler {
    orders: Arc<dyn OrderRepository>,
}

impl FulfillOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(
        &self,
        cmd: FulfillOrderCommand,
    ) -> Result<FulfillOrderResult, CheckoutError> {
        let order = self
            .orders
            .find_by_id(cmd.order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(cmd.order_id))?;

        let items = self.orders.items(order.id).await?;
        let amount = total_cost(&items);

        match order.status {
            OrderStatus::Paid => {
                return Ok(FulfillOrderResult::AlreadyFulfilled {
                    order_id: order.id,
                    amount,
                });
            }
            OrderStatus::Abandoned => {
                return Err(CheckoutError::InvalidState {
                    order_id: order.id,
                    status: order.status,
                });
            }
            OrderStatus::Pending => {}
        }

        let transaction_id = cmd.transaction_id.ok_or_else(|| {
            CheckoutError::validation("payment_intent", "missing from completed session")
        })?;

        // Single winner under concurrent redirect-back/webhook delivery
        let won = self.orders.mark_paid_if_pending(order.id).await?;
        if !won {
            return Ok(FulfillOrderResult::AlreadyFulfilled {
                order_id: order.id,
                amount,
            });
        }

        if let Some(reported) = cmd.amount_total {
            match to_minor_units(amount) {
                Ok(expected) if expected != reported => {
                    tracing::warn!(
                        order_id = %order.id,
                        expected_minor_units = expected,
                        reported_minor_units = reported,
                        "Provider-reported amount disagrees with order total"
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        order_id = %order.id,
                        error = %err,
                        "Order total not comparable to provider amount"
                    );
                }
            }
        }

        let created = self
            .orders
            .record_payment(NewPayment {
                order_id: order.id,
                transaction_id: transaction_id.clone(),
                amount,
            })
            .await?;

        if !created {
            // The unique constraint swallowed a duplicate receipt.
            tracing::warn!(
                order_id = %order.id,
                transaction_id = %transaction_id,
                "Payment receipt already recorded, duplicate suppressed"
            );
        }

        tracing::info!(
            order_id = %order.id,
            transaction_id = %transaction_id,
            amount = %amount,
            "Order fulfilled"
        );

        Ok(FulfillOrderResult::Fulfilled {
            order_id: order.id,
            amount,
        })
    }
}
