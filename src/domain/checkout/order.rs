//! Order, order items, and payment receipts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, PaymentId, ProductId, Timestamp, UserId};

/// Lifecycle of an order.
///
/// `Pending` orders are created when checkout starts. Exactly one
/// transition out of `Pending` happens: to `Paid` on fulfillment, or to
/// `Abandoned` when the provider call fails. An abandoned order is never
/// paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Checkout started, payment not yet confirmed.
    Pending,
    /// Payment confirmed, receipt recorded.
    Paid,
    /// Provider session creation failed; order is dead.
    Abandoned,
}

impl OrderStatus {
    /// True once the order has been fulfilled.
    pub fn is_paid(&self) -> bool {
        matches!(self, OrderStatus::Paid)
    }
}

/// A purchase attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// True once the order has been fulfilled.
    pub fn is_paid(&self) -> bool {
        self.status.is_paid()
    }
}

/// A line in an order.
///
/// The price is captured from the catalog at purchase time and never
/// follows later catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub price: Decimal,
    pub quantity: u32,
}

/// An order item about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub price: Decimal,
    pub quantity: u32,
}

/// Receipt of a completed charge. At most one exists per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    /// Transaction identifier reported by the provider.
    pub transaction_id: String,
    pub amount: Decimal,
    pub created_at: Timestamp,
}

/// A payment receipt about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub transaction_id: String,
    pub amount: Decimal,
}

/// Total cost of an order: Σ price × quantity over its items.
pub fn total_cost(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum()
}
