//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    /// Public base URL of the storefront, used to build the
    /// success/cancel redirect URLs sent to Stripe
    pub public_base_url: String,

    /// ISO 4217 currency code used for line items
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Base URL for the Stripe API (overridable for testing)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Success redirect URL, carrying Stripe's session-id placeholder.
    ///
    /// Stripe substitutes `{CHECKOUT_SESSION_ID}` with the real session id
    /// when redirecting the customer back.
    pub fn success_url(&self) -> String {
        format!(
            "{}/payment/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.public_base_url.trim_end_matches('/')
        )
    }

    /// Cancel redirect URL.
    pub fn cancel_url(&self) -> String {
        format!(
            "{}/payment/cancel",
            self.public_base_url.trim_end_matches('/')
        )
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if !self.public_base_url.starts_with("http://")
            && !self.public_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidPublicBaseUrl);
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ValidationError::InvalidCurrency);
        }

        Ok(())
    }
}
