//! Webhook signature verification.
//!
//! Implements verification of provider webhook signatures using
//! HMAC-SHA256 with constant-time comparison, plus timestamp validation
//! to prevent replay attacks. An unverified payload never reaches
//! fulfillment.

use axum::http::StatusCode;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::provider_event::{CheckoutEvent, ProviderEvent};

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Errors raised while authenticating a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// The signature does not verify against the shared secret.
    #[error("Webhook signature mismatch")]
    SignatureMismatch,

    /// Event timestamp is outside the acceptable window.
    #[error("Webhook timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Webhook timestamp in the future")]
    TimestampInFuture,

    /// The signature header or JSON body is malformed.
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// Required metadata field missing from the event.
    #[error("Webhook event missing metadata: {0}")]
    MissingMetadata(&'static str),
}

impl WebhookError {
    /// Maps the error to an HTTP status code.
    ///
    /// Every authentication failure is a client error: the provider does
    /// not retry 4xx deliveries of payloads we will never accept.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// Parsed components from the signature header.
///
/// Format: `t=<timestamp>,v1=<signature>[,v0=<legacy>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// v1 signature (HMAC-SHA256).
    pub v1_signature: Vec<u8>,
    /// Optional v0 legacy signature.
    pub v0_signature: Option<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses a signature header string.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::InvalidPayload` if the header format is
    /// invalid.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;
        let mut v0_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                WebhookError::InvalidPayload("invalid signature header format".to_string())
            })?;

            match key.trim() {
                "t" => {
                    timestamp = Some(value.trim().parse().map_err(|_| {
                        WebhookError::InvalidPayload("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex::decode(value.trim()).map_err(|_| {
                        WebhookError::InvalidPayload("invalid v1 signature hex".to_string())
                    })?);
                }
                "v0" => {
                    v0_signature = Some(hex::decode(value.trim()).map_err(|_| {
                        WebhookError::InvalidPayload("invalid v0 signature hex".to_string())
                    })?);
                }
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            WebhookError::InvalidPayload("missing timestamp".to_string())
        })?;
        let v1_signature = v1_signature.ok_or_else(|| {
            WebhookError::InvalidPayload("missing v1 signature".to_string())
        })?;

        Ok(SignatureHeader {
            timestamp,
            v1_signature,
            v0_signature,
        })
    }
}

/// Verifier for provider webhook signatures.
pub struct WebhookVerifier {
    /// The webhook signing secret from the provider dashboard.
    secret: String,
}

impl WebhookVerifier {
    /// Creates a new verifier with the given webhook secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the webhook signature and parses the event.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the signature header
    /// 2. Validate timestamp is within acceptable range
    /// 3. Compute expected signature using HMAC-SHA256 over
    ///    `"{timestamp}.{payload}"`
    /// 4. Compare signatures using constant-time comparison
    /// 5. Parse the JSON payload and narrow it to a typed event
    ///
    /// # Errors
    ///
    /// - `SignatureMismatch` - Signature verification failed
    /// - `TimestampOutOfRange` - Event is older than 5 minutes
    /// - `TimestampInFuture` - Event timestamp is in the future
    /// - `InvalidPayload` - Failed to parse header or JSON payload
    /// - `MissingMetadata` - Completed session lacks an `order_id`
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<CheckoutEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp)?;

        let expected_signature = self.compute_signature(header.timestamp, payload);
        if !constant_time_compare(&expected_signature, &header.v1_signature) {
            return Err(WebhookError::SignatureMismatch);
        }

        let event: ProviderEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

        event.into_checkout_event()
    }

    /// Validates that the timestamp is within acceptable bounds.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }

        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::TimestampInFuture);
        }

        Ok(())
    }

    /// Computes the HMAC-SHA256 signature for the given timestamp and payload.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));

        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(signed_payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a hex-encoded HMAC-SHA256 signature for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
