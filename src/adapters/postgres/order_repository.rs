//! PostgreSQL implementation of OrderRepository.
//!
//! The fulfillment race (redirect-back vs webhook) is decided here:
//! `mark_paid_if_pending` is a conditional UPDATE guarded by the previous
//! status, and `record_payment` inserts under the `payments.order_id`
//! unique constraint with `ON CONFLICT DO NOTHING`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::checkout::{
    CheckoutError, NewOrderItem, NewPayment, Order, OrderItem, OrderStatus, Payment,
};
use crate::domain::foundation::{OrderId, PaymentId, ProductId, Timestamp, UserId};
use crate::ports::OrderRepository;

/// PostgreSQL implementation of the OrderRepository port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Creates a new PgOrderRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = CheckoutError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            status: parse_status(&row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Database row representation of an order item.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    price: Decimal,
    quantity: i32,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = CheckoutError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            CheckoutError::storage(format!("Invalid quantity in row: {}", row.quantity))
        })?;

        Ok(OrderItem {
            order_id: OrderId::from_uuid(row.order_id),
            product_id: ProductId::from_uuid(row.product_id),
            price: row.price,
            quantity,
        })
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    transaction_id: String,
    amount: Decimal,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: PaymentId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            transaction_id: row.transaction_id,
            amount: row.amount,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

fn parse_status(s: &str) -> Result<OrderStatus, CheckoutError> {
    match s {
        "pending" => Ok(OrderStatus::Pending),
        "paid" => Ok(OrderStatus::Paid),
        "abandoned" => Ok(OrderStatus::Abandoned),
        _ => Err(CheckoutError::storage(format!(
            "Invalid order status value: {}",
            s
        ))),
    }
}

fn status_to_string(status: &OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Paid => "paid",
        OrderStatus::Abandoned => "abandoned",
    }
}

fn storage_err(context: &str) -> impl FnOnce(sqlx::Error) -> CheckoutError + '_ {
    move |e| CheckoutError::storage(format!("{context}: {e}"))
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_pending(
        &self,
        user_id: UserId,
        items: &[NewOrderItem],
    ) -> Result<Order, CheckoutError> {
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            user_id,
            status: OrderStatus::Pending,
            created_at: Timestamp::from_datetime(now),
            updated_at: Timestamp::from_datetime(now),
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_err("Failed to begin transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(status_to_string(&order.status))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(storage_err("Failed to insert order"))?;

        for (position, item) in items.iter().enumerate() {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                CheckoutError::validation("quantity", "exceeds the supported maximum")
            })?;

            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, price, quantity, position)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(item.price)
            .bind(quantity)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(storage_err("Failed to insert order item"))?;
        }

        tx.commit()
            .await
            .map_err(storage_err("Failed to commit order"))?;

        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, CheckoutError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, status, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err("Failed to find order"))?;

        row.map(Order::try_from).transpose()
    }

    async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, CheckoutError> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT order_id, product_id, price, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("Failed to load order items"))?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }

    async fn mark_paid_if_pending(&self, id: OrderId) -> Result<bool, CheckoutError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'paid', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(storage_err("Failed to mark order paid"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_abandoned(&self, id: OrderId) -> Result<(), CheckoutError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'abandoned', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(storage_err("Failed to mark order abandoned"))?;

        if result.rows_affected() == 0 {
            tracing::debug!(order_id = %id, "Order was not pending, abandon skipped");
        }

        Ok(())
    }

    async fn record_payment(&self, payment: NewPayment) -> Result<bool, CheckoutError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, transaction_id, amount, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (order_id) DO NOTHING
            "#,
        )
        .bind(PaymentId::new().as_uuid())
        .bind(payment.order_id.as_uuid())
        .bind(&payment.transaction_id)
        .bind(payment.amount)
        .execute(&self.pool)
        .await
        .map_err(storage_err("Failed to record payment"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_payment(&self, order_id: OrderId) -> Result<Option<Payment>, CheckoutError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, transaction_id, amount, created_at
            FROM payments
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err("Failed to find payment"))?;

        Ok(row.map(Payment::from))
    }
}
