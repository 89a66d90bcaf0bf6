//! Stripe checkout gateway adapter.
//!
//! Implements the `CheckoutGateway` trait against the Stripe REST API.
//! Sessions are created and retrieved with form-encoded requests
//! authenticated by the secret API key; webhooks are verified with
//! HMAC-SHA256 and constant-time comparison.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::PaymentConfig;
use crate::domain::checkout::{CheckoutError, CheckoutEvent, WebhookError, WebhookVerifier};
use crate::ports::{CheckoutGateway, CreateSessionRequest, HostedCheckout, SessionDetails};

use super::session_types::StripeSession;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Build from the validated application payment config.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            api_key: SecretString::new(config.stripe_api_key.clone()),
            webhook_secret: SecretString::new(config.stripe_webhook_secret.clone()),
            api_base_url: config.api_base_url.clone(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe implementation of the `CheckoutGateway` port.
pub struct StripeCheckoutGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
    verifier: WebhookVerifier,
}

impl StripeCheckoutGateway {
    /// Create a new Stripe gateway with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        let verifier = WebhookVerifier::new(config.webhook_secret.expose_secret().clone());
        Self {
            config,
            http_client: reqwest::Client::new(),
            verifier,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }
}

/// Form parameters for the checkout-session creation call.
///
/// Line items are indexed the way Stripe's form encoding expects:
/// `line_items[0][price_data][unit_amount]=1000&line_items[0][quantity]=2&...`
fn session_params(request: &CreateSessionRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        (
            "metadata[order_id]".to_string(),
            request.order_id.to_string(),
        ),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        params.push((
            format!("line_items[{i}][price_data][currency]"),
            item.currency.clone(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        params.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
    }

    params
}

#[async_trait]
impl CheckoutGateway for StripeCheckoutGateway {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<HostedCheckout, CheckoutError> {
        let url = self.api_url("/v1/checkout/sessions");
        let params = session_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| CheckoutError::provider(e.to_string(), true))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(error = %error_text, "Stripe create_session failed");
            return Err(CheckoutError::provider(
                format!("Stripe API error: {}", error_text),
                false,
            ));
        }

        let session: StripeSession = response.json().await.map_err(|e| {
            CheckoutError::provider(format!("Failed to parse Stripe response: {}", e), false)
        })?;

        // Older API versions omit the url field
        let url = session
            .url
            .unwrap_or_else(|| format!("https://checkout.stripe.com/c/pay/{}", &session.id));

        Ok(HostedCheckout {
            id: session.id,
            url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails, CheckoutError> {
        let url = self.api_url(&format!("/v1/checkout/sessions/{}", session_id));

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| CheckoutError::provider(e.to_string(), true))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CheckoutError::validation(
                "session_id",
                "unknown checkout session",
            ));
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(error = %error_text, "Stripe retrieve_session failed");
            return Err(CheckoutError::provider(
                format!("Stripe API error: {}", error_text),
                false,
            ));
        }

        let session: StripeSession = response.json().await.map_err(|e| {
            CheckoutError::provider(format!("Failed to parse Stripe response: {}", e), false)
        })?;

        let order_id = session
            .metadata
            .get("order_id")
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| {
                CheckoutError::validation("session_id", "session carries no order metadata")
            })?;

        Ok(SessionDetails {
            id: session.id,
            order_id,
            transaction_id: session.payment_intent,
            amount_total: session.amount_total,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<CheckoutEvent, WebhookError> {
        self.verifier.verify_and_parse(payload, signature)
    }
}
