//! In-memory checkout gateway for tests and local development.
//!
//! Behaves like the Stripe adapter without the network: sessions are held
//! in memory with deterministic ids, and webhook verification runs the
//! real HMAC verifier against a configurable secret.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::checkout::{CheckoutError, CheckoutEvent, WebhookError, WebhookVerifier};
use crate::ports::{CheckoutGateway, CreateSessionRequest, HostedCheckout, SessionDetails};

/// Mock implementation of the `CheckoutGateway` port.
pub struct MockCheckoutGateway {
    verifier: WebhookVerifier,
    sessions: Mutex<HashMap<String, SessionDetails>>,
    create_requests: Mutex<Vec<CreateSessionRequest>>,
    next_id: AtomicU64,
    fail_create: AtomicBool,
}

impl MockCheckoutGateway {
    /// Create a mock gateway verifying webhooks against `webhook_secret`.
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            verifier: WebhookVerifier::new(webhook_secret),
            sessions: Mutex::new(HashMap::new()),
            create_requests: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            fail_create: AtomicBool::new(false),
        }
    }

    /// Make subsequent `create_session` calls fail like a provider outage.
    pub fn fail_session_creation(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Requests recorded by `create_session`, in call order.
    pub fn recorded_requests(&self) -> Vec<CreateSessionRequest> {
        self.create_requests.lock().unwrap().clone()
    }

    /// The session created for the given id, if any.
    pub fn session(&self, session_id: &str) -> Option<SessionDetails> {
        self.sessions.lock().unwrap().get(session_id).cloned()
    }
}

#[async_trait]
impl CheckoutGateway for MockCheckoutGateway {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<HostedCheckout, CheckoutError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(CheckoutError::provider("simulated provider outage", true));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("cs_mock_{n}");
        let amount_total: i64 = request
            .line_items
            .iter()
            .map(|item| item.unit_amount * i64::from(item.quantity))
            .sum();

        let details = SessionDetails {
            id: id.clone(),
            order_id: request.order_id,
            transaction_id: Some(format!("pi_mock_{n}")),
            amount_total: Some(amount_total),
        };

        self.sessions.lock().unwrap().insert(id.clone(), details);
        self.create_requests.lock().unwrap().push(request);

        Ok(HostedCheckout {
            url: format!("https://checkout.example.com/pay/{id}"),
            id,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails, CheckoutError> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| CheckoutError::validation("session_id", "unknown checkout session"))
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<CheckoutEvent, WebhookError> {
        self.verifier.verify_and_parse(payload, signature)
    }
}
