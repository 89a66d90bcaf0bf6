//! Checkout domain - carts, orders, fulfillment, and webhook verification.
//!
//! The flow has three responsibilities:
//!
//! - building a hosted checkout session from a cart (pending order +
//!   priced line items),
//! - idempotently fulfilling an order once the provider reports payment,
//! - authenticating provider webhooks before they may trigger fulfillment.

mod cart;
mod errors;
mod line_item;
mod order;
mod provider_event;
mod webhook;

pub use cart::{Cart, CartLine, RawCartLine};
pub use errors::CheckoutError;
pub use line_item::LineItem;
pub use order::{total_cost, NewOrderItem, NewPayment, Order, OrderItem, OrderStatus, Payment};
pub use provider_event::{CheckoutEvent, CompletedCheckout, ProviderEvent, ProviderEventData};
pub use webhook::{SignatureHeader, WebhookError, WebhookVerifier};

#[cfg(test)]
pub use webhook::compute_test_signature;
