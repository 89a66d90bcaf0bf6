//! HTTP adapter for the checkout flow.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, PaymentCancelResponse, PaymentSuccessResponse, WebhookAck};
pub use handlers::{AuthenticatedUser, CheckoutApiError, CheckoutAppState};
pub use routes::{checkout_router, checkout_routes, payment_routes, webhook_routes};
