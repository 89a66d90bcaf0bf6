//! Command handlers for the checkout flow.

pub mod checkout;

pub use checkout::{
    CheckoutSessionSettings, CompleteRedirectCommand, CompleteRedirectHandler,
    CompleteRedirectResult, FulfillOrderCommand, FulfillOrderHandler, FulfillOrderResult,
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, HandleCheckoutWebhookResult,
    StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult,
};
