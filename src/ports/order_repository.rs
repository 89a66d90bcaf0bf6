//! Order repository port.

use async_trait::async_trait;

use crate::domain::checkout::{CheckoutError, NewOrderItem, NewPayment, Order, OrderItem, Payment};
use crate::domain::foundation::{OrderId, UserId};

/// Port for order, order-item, and payment persistence.
///
/// The two conditional operations (`mark_paid_if_pending`,
/// `record_payment`) carry the concurrency contract of the fulfillment
/// flow: the redirect-back handler and the webhook handler may both try
/// to fulfill the same order, and implementations must decide a single
/// winner atomically (conditional update, unique constraint) - a plain
/// read-then-write is not an acceptable implementation.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Creates a pending order together with all of its items, in one
    /// transaction. Either everything is persisted or nothing is.
    async fn create_pending(
        &self,
        user_id: UserId,
        items: &[NewOrderItem],
    ) -> Result<Order, CheckoutError>;

    /// Looks up an order by id.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, CheckoutError>;

    /// Returns the items of an order, in insertion order.
    async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, CheckoutError>;

    /// Atomically transitions an order from pending to paid.
    ///
    /// Returns `true` if this call performed the transition, `false` if
    /// the order was not pending (already paid, abandoned, or missing).
    async fn mark_paid_if_pending(&self, id: OrderId) -> Result<bool, CheckoutError>;

    /// Marks a pending order abandoned after a provider failure.
    async fn mark_abandoned(&self, id: OrderId) -> Result<(), CheckoutError>;

    /// Records a payment receipt, at most once per order.
    ///
    /// Returns `true` if the receipt was created, `false` if one already
    /// existed for the order (the duplicate is suppressed, not an error).
    async fn record_payment(&self, payment: NewPayment) -> Result<bool, CheckoutError>;

    /// Looks up the payment receipt for an order, if any.
    async fn find_payment(&self, order_id: OrderId) -> Result<Option<Payment>, CheckoutError>;
}
