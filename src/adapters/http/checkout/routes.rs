//! Axum router configuration for checkout endpoints.
//!
//! This module defines the route structure for the checkout flow and
//! wires routes to their corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    payment_cancel, payment_success, start_checkout, stripe_webhook, CheckoutAppState,
};

/// Create the checkout router.
///
/// # Routes
/// - `POST /checkout` - Start a hosted checkout from the cart form
///   (requires authentication)
pub fn checkout_routes() -> Router<CheckoutAppState> {
    Router::new().route("/checkout", post(start_checkout))
}

/// Create the payment redirect router.
///
/// These routes are hit by the customer's browser coming back from the
/// provider-hosted page.
///
/// # Routes
/// - `GET /payment/success` - Success redirect (query: `session_id`)
/// - `GET /payment/cancel` - Cancel redirect
pub fn payment_routes() -> Router<CheckoutAppState> {
    Router::new()
        .route("/payment/success", get(payment_success))
        .route("/payment/cancel", get(payment_cancel))
}

/// Create the provider webhook router.
///
/// Separate from the user-facing routes because webhooks carry no user
/// authentication (they are verified via signature).
///
/// # Routes
/// - `POST /webhooks/stripe` - Handle provider webhooks
pub fn webhook_routes() -> Router<CheckoutAppState> {
    Router::new().route("/webhooks/stripe", post(stripe_webhook))
}

/// Create the complete checkout module router.
pub fn checkout_router() -> Router<CheckoutAppState> {
    Router::new()
        .merge(checkout_routes())
        .merge(payment_routes())
        .merge(webhook_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::stripe::MockCheckoutGateway;
    use crate::application::handlers::checkout::CheckoutSessionSettings;
    use crate::domain::checkout::{
        CheckoutError, NewOrderItem, NewPayment, Order, OrderItem, Payment,
    };
    use crate::domain::foundation::{OrderId, ProductId, UserId};
    use crate::ports::{OrderRepository, Product, ProductCatalog};
    use async_trait::async_trait;

    // ════════════════════════════════════════════════════════════════
    // Minimal mocks - routing tests never touch them
    // ════════════════════════════════════════════════════════════════

    struct NoopOrders;

    #[async_trait]
    impl OrderRepository for NoopOrders {
        async fn create_pending(
            &self,
            _user_id: UserId,
            _items: &[NewOrderItem],
        ) -> Result<Order, CheckoutError> {
            Err(CheckoutError::storage("noop"))
        }

        async fn find_by_id(&self, _id: OrderId) -> Result<Option<Order>, CheckoutError> {
            Ok(None)
        }

        async fn items(&self, _id: OrderId) -> Result<Vec<OrderItem>, CheckoutError> {
            Ok(vec![])
        }

        async fn mark_paid_if_pending(&self, _id: OrderId) -> Result<bool, CheckoutError> {
            Ok(false)
        }

        async fn mark_abandoned(&self, _id: OrderId) -> Result<(), CheckoutError> {
            Ok(())
        }

        async fn record_payment(&self, _payment: NewPayment) -> Result<bool, CheckoutError> {
            Ok(false)
        }

        async fn find_payment(&self, _order_id: OrderId) -> Result<Option<Payment>, CheckoutError> {
            Ok(None)
        }
    }

    struct NoopCatalog;

    #[async_trait]
    impl ProductCatalog for NoopCatalog {
        async fn find_by_id(&self, _id: ProductId) -> Result<Option<Product>, CheckoutError> {
            Ok(None)
        }
    }

    fn test_state() -> CheckoutAppState {
        CheckoutAppState {
            orders: Arc::new(NoopOrders),
            catalog: Arc::new(NoopCatalog),
            gateway: Arc::new(MockCheckoutGateway::new("whsec_router_test")),
            session_settings: CheckoutSessionSettings {
                currency: "usd".to_string(),
                success_url: "https://shop.example.com/payment/success".to_string(),
                cancel_url: "https://shop.example.com/payment/cancel".to_string(),
            },
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Router Tests
    // ════════════════════════════════════════════════════════════════

    #[test]
    fn checkout_routes_creates_router() {
        let router = checkout_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn payment_routes_creates_router() {
        let router = payment_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn webhook_routes_creates_router() {
        let router = webhook_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn checkout_router_creates_combined_router() {
        let router = checkout_router();
        let _: Router<()> = router.with_state(test_state());
    }

    // Note: Full end-to-end request tests live in the integration test
    // suite with real handler wiring.
}
