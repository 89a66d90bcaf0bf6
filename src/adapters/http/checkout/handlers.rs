//! HTTP handlers for checkout endpoints.
//!
//! These handlers connect axum routes to the application layer command
//! handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};

use crate::application::handlers::checkout::{
    CheckoutSessionSettings, CompleteRedirectCommand, CompleteRedirectHandler,
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, StartCheckoutCommand,
    StartCheckoutHandler,
};
use crate::domain::checkout::{Cart, CheckoutError, WebhookError};
use crate::domain::foundation::UserId;
use crate::ports::{CheckoutGateway, OrderRepository, ProductCatalog};

use super::dto::{
    ErrorResponse, PaymentCancelResponse, PaymentSuccessResponse, SuccessQuery, WebhookAck,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped
/// dependencies for efficient sharing across handlers.
#[derive(Clone)]
pub struct CheckoutAppState {
    pub orders: Arc<dyn OrderRepository>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub gateway: Arc<dyn CheckoutGateway>,
    pub session_settings: CheckoutSessionSettings,
}

impl CheckoutAppState {
    /// Create handlers on demand from the shared state.
    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            self.catalog.clone(),
            self.orders.clone(),
            self.gateway.clone(),
            self.session_settings.clone(),
        )
    }

    pub fn redirect_handler(&self) -> CompleteRedirectHandler {
        CompleteRedirectHandler::new(self.gateway.clone(), self.orders.clone())
    }

    pub fn webhook_handler(&self) -> HandleCheckoutWebhookHandler {
        HandleCheckoutWebhookHandler::new(self.gateway.clone(), self.orders.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from request.
///
/// In production, this would be extracted from JWT/session by auth
/// middleware. For now, uses a header-based extraction for
/// development/testing.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // In production, this would validate a JWT from the
            // Authorization header; for development we accept X-User-Id
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<UserId>().ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Splits urlencoded form pairs into the parallel `products` and
/// `quantities` lists, preserving submission order.
fn split_cart_fields(pairs: Vec<(String, String)>) -> (Vec<String>, Vec<String>) {
    let mut products = Vec::new();
    let mut quantities = Vec::new();

    for (key, value) in pairs {
        match key.as_str() {
            "products" | "products[]" => products.push(value),
            "quantities" | "quantities[]" => quantities.push(value),
            _ => {}
        }
    }

    (products, quantities)
}

/// POST /checkout - Start a hosted checkout from the cart form.
///
/// Only form submissions are accepted; any other request shape is a
/// client error. On success the customer is redirected to the
/// provider-hosted page.
pub async fn start_checkout(
    State(state): State<CheckoutAppState>,
    user: AuthenticatedUser,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Redirect, CheckoutApiError> {
    let Form(pairs) = form.map_err(|rejection| {
        CheckoutError::InvalidRequest(rejection.body_text())
    })?;

    let (products, quantities) = split_cart_fields(pairs);
    let lines = Cart::pair_form_lists(products, quantities)?;

    let handler = state.start_checkout_handler();
    let result = handler
        .handle(StartCheckoutCommand {
            user_id: user.user_id,
            lines,
        })
        .await?;

    Ok(Redirect::to(&result.redirect_url))
}

/// GET /payment/success - Redirect-back from the hosted checkout.
///
/// Without a `session_id` there is nothing to correlate; the customer is
/// sent back to the storefront root.
pub async fn payment_success(
    State(state): State<CheckoutAppState>,
    Query(query): Query<SuccessQuery>,
) -> Result<Response, CheckoutApiError> {
    let Some(session_id) = query.session_id else {
        return Ok(Redirect::to("/").into_response());
    };

    let handler = state.redirect_handler();
    let result = handler
        .handle(CompleteRedirectCommand { session_id })
        .await?;

    Ok(Json(PaymentSuccessResponse::from(result)).into_response())
}

/// GET /payment/cancel - Redirect-back after an abandoned checkout.
pub async fn payment_cancel() -> Json<PaymentCancelResponse> {
    Json(PaymentCancelResponse::canceled())
}

/// POST /webhooks/stripe - Handle provider webhook events.
pub async fn stripe_webhook(
    State(state): State<CheckoutAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookAck>), CheckoutApiError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            CheckoutError::from(WebhookError::InvalidPayload(
                "missing Stripe-Signature header".to_string(),
            ))
        })?;

    let handler = state.webhook_handler();
    handler
        .handle(HandleCheckoutWebhookCommand {
            payload: body.to_vec(),
            signature: signature.to_string(),
        })
        .await?;

    Ok((StatusCode::OK, Json(WebhookAck { received: true })))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts checkout errors to HTTP responses.
pub struct CheckoutApiError(CheckoutError);

impl From<CheckoutError> for CheckoutApiError {
    fn from(err: CheckoutError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CheckoutApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            CheckoutError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            CheckoutError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            CheckoutError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
            CheckoutError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            CheckoutError::InvalidState { .. } => (StatusCode::CONFLICT, "ORDER_NOT_PAYABLE"),
            CheckoutError::Provider { .. } => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            CheckoutError::Webhook(err) => (err.status_code(), "WEBHOOK_REJECTED"),
            CheckoutError::Storage(_) => {
                tracing::error!(error = %self.0, "Unexpected storage fault");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(error_code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{OrderId, ProductId};

    #[test]
    fn split_cart_fields_preserves_order_and_pairing() {
        let pairs = vec![
            ("products".to_string(), "p1".to_string()),
            ("quantities".to_string(), "2".to_string()),
            ("products".to_string(), "p2".to_string()),
            ("quantities".to_string(), "1".to_string()),
            ("csrf_token".to_string(), "ignored".to_string()),
        ];

        let (products, quantities) = split_cart_fields(pairs);

        assert_eq!(products, vec!["p1", "p2"]);
        assert_eq!(quantities, vec!["2", "1"]);
    }

    #[test]
    fn split_cart_fields_accepts_bracket_suffix() {
        let pairs = vec![
            ("products[]".to_string(), "p1".to_string()),
            ("quantities[]".to_string(), "3".to_string()),
        ];

        let (products, quantities) = split_cart_fields(pairs);

        assert_eq!(products, vec!["p1"]);
        assert_eq!(quantities, vec!["3"]);
    }

    fn status_of(err: CheckoutError) -> StatusCode {
        CheckoutApiError(err).into_response().status()
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let status = status_of(CheckoutError::validation("quantity", "bad"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_request_maps_to_bad_request() {
        let status = status_of(CheckoutError::InvalidRequest("not a form".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_product_maps_to_not_found() {
        let status = status_of(CheckoutError::ProductNotFound(ProductId::new()));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_order_maps_to_not_found() {
        let status = status_of(CheckoutError::OrderNotFound(OrderId::new()));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn provider_failure_maps_to_bad_gateway() {
        let status = status_of(CheckoutError::provider("down", true));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn webhook_rejection_maps_to_bad_request() {
        let status = status_of(CheckoutError::from(WebhookError::SignatureMismatch));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_fault_maps_to_internal_error() {
        let status = status_of(CheckoutError::storage("connection lost"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
