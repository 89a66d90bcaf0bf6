//! Checkout handlers.
//!
//! ## Commands
//! - Starting a checkout (pending order + hosted session)
//! - Fulfilling an order (idempotent paid transition + receipt)
//! - Completing a redirect-back from the provider
//! - Processing provider webhooks

mod complete_redirect;
mod fulfill_order;
mod handle_webhook;
mod start_checkout;

pub use complete_redirect::{
    CompleteRedirectCommand, CompleteRedirectHandler, CompleteRedirectResult,
};
pub use fulfill_order::{FulfillOrderCommand, FulfillOrderHandler, FulfillOrderResult};
pub use handle_webhook::{
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, HandleCheckoutWebhookResult,
};
pub use start_checkout::{
    CheckoutSessionSettings, StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult,
};
