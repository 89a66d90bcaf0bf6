//! Stripe adapter - hosted checkout sessions and webhook verification.

mod mock_gateway;
mod session_types;
mod stripe_gateway;

pub use mock_gateway::MockCheckoutGateway;
pub use session_types::StripeSession;
pub use stripe_gateway::{StripeCheckoutGateway, StripeConfig};
