//! Integration tests for the checkout -> fulfillment flow.
//!
//! These tests verify the end-to-end flow:
//! 1. A cart form becomes a pending order and a hosted checkout session
//! 2. The provider webhook fulfills the order (idempotent under redelivery)
//! 3. The redirect-back path converges on the same fulfillment applier
//! 4. Unverified webhooks never mutate anything
//!
//! Uses in-memory adapters; webhook signatures are real HMAC-SHA256.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sha2::Sha256;
use tower::ServiceExt;
use uuid::Uuid;

use storefront_checkout::adapters::http::{checkout_router, CheckoutAppState};
use storefront_checkout::adapters::stripe::MockCheckoutGateway;
use storefront_checkout::application::handlers::checkout::{
    CheckoutSessionSettings, CompleteRedirectCommand, HandleCheckoutWebhookCommand,
    HandleCheckoutWebhookResult, StartCheckoutCommand,
};
use storefront_checkout::domain::checkout::{
    CheckoutError, NewOrderItem, NewPayment, Order, OrderItem, OrderStatus, Payment, RawCartLine,
};
use storefront_checkout::domain::foundation::{
    OrderId, PaymentId, ProductId, Timestamp, UserId,
};
use storefront_checkout::ports::{OrderRepository, Product, ProductCatalog};

const WEBHOOK_SECRET: &str = "whsec_integration_test";

// =============================================================================
// Test Infrastructure
// =============================================================================

/// In-memory order store with the same conditional-update semantics as
/// the Postgres adapter.
#[derive(Default)]
struct InMemoryOrders {
    orders: Mutex<Vec<Order>>,
    items: Mutex<Vec<OrderItem>>,
    payments: Mutex<Vec<Payment>>,
}

impl InMemoryOrders {
    fn order_status(&self, id: OrderId) -> Option<OrderStatus> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.status)
    }

    fn payment_count(&self) -> usize {
        self.payments.lock().unwrap().len()
    }

    fn payments_for(&self, id: OrderId) -> Vec<Payment> {
        self.payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.order_id == id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn create_pending(
        &self,
        user_id: UserId,
        items: &[NewOrderItem],
    ) -> Result<Order, CheckoutError> {
        let order = Order {
            id: OrderId::new(),
            user_id,
            status: OrderStatus::Pending,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        };
        self.orders.lock().unwrap().push(order.clone());
        self.items
            .lock()
            .unwrap()
            .extend(items.iter().map(|item| OrderItem {
                order_id: order.id,
                product_id: item.product_id,
                price: item.price,
                quantity: item.quantity,
            }));
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, CheckoutError> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, CheckoutError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.order_id == id)
            .cloned()
            .collect())
    }

    async fn mark_paid_if_pending(&self, id: OrderId) -> Result<bool, CheckoutError> {
        let mut orders = self.orders.lock().unwrap();
        match orders
            .iter_mut()
            .find(|o| o.id == id && o.status == OrderStatus::Pending)
        {
            Some(order) => {
                order.status = OrderStatus::Paid;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_abandoned(&self, id: OrderId) -> Result<(), CheckoutError> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(order) = orders
            .iter_mut()
            .find(|o| o.id == id && o.status == OrderStatus::Pending)
        {
            order.status = OrderStatus::Abandoned;
        }
        Ok(())
    }

    async fn record_payment(&self, payment: NewPayment) -> Result<bool, CheckoutError> {
        let mut payments = self.payments.lock().unwrap();
        if payments.iter().any(|p| p.order_id == payment.order_id) {
            return Ok(false);
        }
        payments.push(Payment {
            id: PaymentId::new(),
            order_id: payment.order_id,
            transaction_id: payment.transaction_id,
            amount: payment.amount,
            created_at: Timestamp::now(),
        });
        Ok(true)
    }

    async fn find_payment(&self, order_id: OrderId) -> Result<Option<Payment>, CheckoutError> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.order_id == order_id)
            .cloned())
    }
}

struct InMemoryCatalog {
    products: Vec<Product>,
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, CheckoutError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }
}

struct TestHarness {
    orders: Arc<InMemoryOrders>,
    gateway: Arc<MockCheckoutGateway>,
    state: CheckoutAppState,
    product_a: Product,
    product_b: Product,
}

fn harness() -> TestHarness {
    let product_a = Product {
        id: ProductId::new(),
        name: "Alpha Widget".to_string(),
        price: dec!(10.00),
    };
    let product_b = Product {
        id: ProductId::new(),
        name: "Beta Gadget".to_string(),
        price: dec!(5.00),
    };

    let orders = Arc::new(InMemoryOrders::default());
    let gateway = Arc::new(MockCheckoutGateway::new(WEBHOOK_SECRET));
    let catalog = Arc::new(InMemoryCatalog {
        products: vec![product_a.clone(), product_b.clone()],
    });

    let state = CheckoutAppState {
        orders: orders.clone(),
        catalog,
        gateway: gateway.clone(),
        session_settings: CheckoutSessionSettings {
            currency: "usd".to_string(),
            success_url:
                "https://shop.example.com/payment/success?session_id={CHECKOUT_SESSION_ID}"
                    .to_string(),
            cancel_url: "https://shop.example.com/payment/cancel".to_string(),
        },
    };

    TestHarness {
        orders,
        gateway,
        state,
        product_a,
        product_b,
    }
}

fn user() -> UserId {
    UserId::from_uuid(Uuid::new_v4())
}

fn line(product_id: ProductId, quantity: &str) -> RawCartLine {
    RawCartLine {
        product_id: product_id.to_string(),
        quantity: quantity.to_string(),
    }
}

/// Signs a payload the way the provider does: HMAC-SHA256 over
/// `"{timestamp}.{payload}"` with the shared secret, hex-encoded.
fn sign(payload: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes())
        .expect("HMAC accepts any key");
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
}

fn completed_event(session_id: &str, order_id: OrderId, amount_total: i64) -> String {
    serde_json::to_string(&serde_json::json!({
        "id": "evt_integration_1",
        "type": "checkout.session.completed",
        "created": chrono::Utc::now().timestamp(),
        "data": {
            "object": {
                "id": session_id,
                "metadata": {"order_id": order_id.to_string()},
                "payment_intent": "pi_integration_1",
                "amount_total": amount_total
            }
        },
        "livemode": false
    }))
    .unwrap()
}

// =============================================================================
// Handler-level flow tests
// =============================================================================

#[tokio::test]
async fn checkout_then_webhook_fulfills_exactly_once() {
    let h = harness();

    // Start checkout: [(A, 10.00, 2), (B, 5.00, 1)]
    let result = h
        .state
        .start_checkout_handler()
        .handle(StartCheckoutCommand {
            user_id: user(),
            lines: vec![line(h.product_a.id, "2"), line(h.product_b.id, "1")],
        })
        .await
        .unwrap();

    let order_id = result.order.id;
    assert_eq!(h.orders.order_status(order_id), Some(OrderStatus::Pending));

    // The session carried the order id and the priced line items
    let requests = h.gateway.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].order_id, order_id);
    assert_eq!(requests[0].line_items[0].unit_amount, 1000);
    assert_eq!(requests[0].line_items[1].unit_amount, 500);

    // Provider posts the completion webhook
    let payload = completed_event("cs_mock_1", order_id, 2500);
    let outcome = h
        .state
        .webhook_handler()
        .handle(HandleCheckoutWebhookCommand {
            payload: payload.as_bytes().to_vec(),
            signature: sign(&payload),
        })
        .await
        .unwrap();

    assert_eq!(outcome, HandleCheckoutWebhookResult::Fulfilled { order_id });
    assert_eq!(h.orders.order_status(order_id), Some(OrderStatus::Paid));

    let payments = h.orders.payments_for(order_id);
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, dec!(25.00));
    assert_eq!(payments[0].transaction_id, "pi_integration_1");

    // Provider redelivers: a no-op, still exactly one payment
    let redelivered = completed_event("cs_mock_1", order_id, 2500);
    let outcome = h
        .state
        .webhook_handler()
        .handle(HandleCheckoutWebhookCommand {
            payload: redelivered.as_bytes().to_vec(),
            signature: sign(&redelivered),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        HandleCheckoutWebhookResult::AlreadyFulfilled { order_id }
    );
    assert_eq!(h.orders.payment_count(), 1);
}

#[tokio::test]
async fn redirect_back_and_webhook_converge_on_one_payment() {
    let h = harness();

    let result = h
        .state
        .start_checkout_handler()
        .handle(StartCheckoutCommand {
            user_id: user(),
            lines: vec![line(h.product_a.id, "1")],
        })
        .await
        .unwrap();
    let order_id = result.order.id;

    assert_eq!(h.gateway.recorded_requests()[0].order_id, order_id);

    // The customer lands on the success page first
    let redirect = h
        .state
        .redirect_handler()
        .handle(CompleteRedirectCommand {
            session_id: "cs_mock_1".to_string(),
        })
        .await
        .unwrap();

    assert!(redirect.newly_fulfilled);
    assert_eq!(redirect.amount, dec!(10.00));
    assert_eq!(h.orders.order_status(order_id), Some(OrderStatus::Paid));

    // The webhook arrives later and is a no-op
    let payload = completed_event("cs_mock_1", order_id, 1000);
    let outcome = h
        .state
        .webhook_handler()
        .handle(HandleCheckoutWebhookCommand {
            payload: payload.as_bytes().to_vec(),
            signature: sign(&payload),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        HandleCheckoutWebhookResult::AlreadyFulfilled { order_id }
    );
    assert_eq!(h.orders.payment_count(), 1);
}

#[tokio::test]
async fn provider_outage_abandons_order_instead_of_dangling() {
    let h = harness();
    h.gateway.fail_session_creation(true);

    let result = h
        .state
        .start_checkout_handler()
        .handle(StartCheckoutCommand {
            user_id: user(),
            lines: vec![line(h.product_a.id, "1")],
        })
        .await;

    assert!(matches!(result, Err(CheckoutError::Provider { .. })));

    let orders = h.orders.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Abandoned);
}

#[tokio::test]
async fn forged_webhook_never_mutates_an_order() {
    let h = harness();

    let result = h
        .state
        .start_checkout_handler()
        .handle(StartCheckoutCommand {
            user_id: user(),
            lines: vec![line(h.product_a.id, "1")],
        })
        .await
        .unwrap();
    let order_id = result.order.id;

    // Valid body, signature computed with the wrong secret
    let payload = completed_event("cs_mock_1", order_id, 1000);
    let timestamp = chrono::Utc::now().timestamp();
    let mut mac =
        Hmac::<Sha256>::new_from_slice(b"whsec_attacker").expect("HMAC accepts any key");
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    let forged = format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()));

    let outcome = h
        .state
        .webhook_handler()
        .handle(HandleCheckoutWebhookCommand {
            payload: payload.as_bytes().to_vec(),
            signature: forged,
        })
        .await;

    assert!(outcome.is_err());
    assert_eq!(h.orders.order_status(order_id), Some(OrderStatus::Pending));
    assert_eq!(h.orders.payment_count(), 0);
}

// =============================================================================
// HTTP-level tests
// =============================================================================

#[tokio::test]
async fn http_checkout_redirects_to_hosted_page() {
    let h = harness();
    let app = checkout_router().with_state(h.state.clone());

    let body = format!(
        "products={}&quantities=2&products={}&quantities=1",
        h.product_a.id, h.product_b.id
    );
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/checkout")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("X-User-Id", user().to_string())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(location, "https://checkout.example.com/pay/cs_mock_1");
}

#[tokio::test]
async fn http_checkout_rejects_bad_quantity_with_400() {
    let h = harness();
    let app = checkout_router().with_state(h.state.clone());

    let body = format!("products={}&quantities=abc", h.product_a.id);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/checkout")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("X-User-Id", user().to_string())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // Nothing was persisted for the rejected cart
    assert!(h.orders.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn http_checkout_rejects_non_form_request() {
    let h = harness();
    let app = checkout_router().with_state(h.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/checkout")
                .header(header::CONTENT_TYPE, "application/json")
                .header("X-User-Id", user().to_string())
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn http_success_redirect_renders_receipt() {
    let h = harness();
    let app = checkout_router().with_state(h.state.clone());

    // Seed a checkout through the handler to get a live session
    let result = h
        .state
        .start_checkout_handler()
        .handle(StartCheckoutCommand {
            user_id: user(),
            lines: vec![line(h.product_a.id, "2"), line(h.product_b.id, "1")],
        })
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/payment/success?session_id=cs_mock_1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["order_id"], result.order.id.to_string());
    assert_eq!(json["amount"], "25.00");
    assert_eq!(json["newly_fulfilled"], true);

    let payment = h.orders.payments_for(result.order.id);
    assert_eq!(payment.len(), 1);
    assert_eq!(payment[0].amount, Decimal::new(2500, 2));
}

#[tokio::test]
async fn http_success_without_session_redirects_home() {
    let h = harness();
    let app = checkout_router().with_state(h.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/payment/success")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn http_cancel_acknowledges_without_state_change() {
    let h = harness();
    let app = checkout_router().with_state(h.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/payment/cancel")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(h.orders.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn http_webhook_without_signature_is_400() {
    let h = harness();

    let result = h
        .state
        .start_checkout_handler()
        .handle(StartCheckoutCommand {
            user_id: user(),
            lines: vec![line(h.product_a.id, "1")],
        })
        .await
        .unwrap();

    let app = checkout_router().with_state(h.state.clone());
    let payload = completed_event("cs_mock_1", result.order.id, 1000);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/stripe")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        h.orders.order_status(result.order.id),
        Some(OrderStatus::Pending)
    );
}

#[tokio::test]
async fn http_webhook_with_valid_signature_fulfills() {
    let h = harness();

    let result = h
        .state
        .start_checkout_handler()
        .handle(StartCheckoutCommand {
            user_id: user(),
            lines: vec![line(h.product_a.id, "1")],
        })
        .await
        .unwrap();

    let app = checkout_router().with_state(h.state.clone());
    let payload = completed_event("cs_mock_1", result.order.id, 1000);
    let signature = sign(&payload);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/stripe")
                .header(header::CONTENT_TYPE, "application/json")
                .header("Stripe-Signature", signature)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        h.orders.order_status(result.order.id),
        Some(OrderStatus::Paid)
    );
    assert_eq!(h.orders.payment_count(), 1);
}

#[tokio::test]
async fn http_webhook_ignores_unrelated_event_types() {
    let h = harness();
    let app = checkout_router().with_state(h.state.clone());

    let payload = serde_json::to_string(&serde_json::json!({
        "id": "evt_other",
        "type": "charge.refunded",
        "created": chrono::Utc::now().timestamp(),
        "data": {"object": {}},
        "livemode": false
    }))
    .unwrap();
    let signature = sign(&payload);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/stripe")
                .header(header::CONTENT_TYPE, "application/json")
                .header("Stripe-Signature", signature)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.orders.payment_count(), 0);
}
