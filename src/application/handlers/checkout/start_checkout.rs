//! StartCheckoutHandler - Command handler for starting a hosted checkout.

use std::sync::Arc;

use crate::domain::checkout::{Cart, CheckoutError, LineItem, NewOrderItem, Order, RawCartLine};
use crate::domain::foundation::UserId;
use crate::ports::{CheckoutGateway, CreateSessionRequest, OrderRepository, ProductCatalog};

/// Session parameters shared by every checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSessionSettings {
    /// ISO 4217 currency code for line items, lowercase.
    pub currency: String,
    /// Success redirect URL (with the provider's session-id placeholder).
    pub success_url: String,
    /// Cancel redirect URL.
    pub cancel_url: String,
}

/// Command to start a checkout for a user's cart.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    /// The user the order belongs to.
    pub user_id: UserId,
    /// Cart lines exactly as submitted by the form.
    pub lines: Vec<RawCartLine>,
}

/// Result of starting a checkout.
#[derive(Debug, Clone)]
pub struct StartCheckoutResult {
    /// The pending order created for this checkout.
    pub order: Order,
    /// Provider-hosted page to redirect the customer to.
    pub redirect_url: String,
}

/// Handler that turns a cart into a pending order and a hosted session.
///
/// All validation (quantities, product existence) happens before any
/// write; order and items are committed in one transaction. If the
/// provider call then fails, the order is marked abandoned rather than
/// left dangling.
pub struct StartCheckoutHandler {
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn CheckoutGateway>,
    settings: CheckoutSessionSettings,
}

impl StartCheckoutHandler {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn CheckoutGateway>,
        settings: CheckoutSessionSettings,
    ) -> Self {
        Self {
            catalog,
            orders,
            gateway,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
    ) -> Result<StartCheckoutResult, CheckoutError> {
        // 1. Validate the whole cart up front
        let cart = Cart::parse(&cmd.lines)?;

        // 2. Resolve every product and price every line
        let mut line_items = Vec::with_capacity(cart.lines().len());
        let mut new_items = Vec::with_capacity(cart.lines().len());

        for line in cart.lines() {
            let product = self
                .catalog
                .find_by_id(line.product_id)
                .await?
                .ok_or(CheckoutError::ProductNotFound(line.product_id))?;

            line_items.push(LineItem::priced(
                product.name.clone(),
                product.price,
                line.quantity,
                &self.settings.currency,
            )?);
            new_items.push(NewOrderItem {
                product_id: product.id,
                price: product.price,
                quantity: line.quantity,
            });
        }

        // 3. Commit the pending order and its items together
        let order = self.orders.create_pending(cmd.user_id, &new_items).await?;

        // 4. Ask the provider for a hosted session
        let session_request = CreateSessionRequest {
            line_items,
            order_id: order.id,
            success_url: self.settings.success_url.clone(),
            cancel_url: self.settings.cancel_url.clone(),
        };

        let session = match self.gateway.create_session(session_request).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(
                    order_id = %order.id,
                    error = %err,
                    "Provider session creation failed, abandoning order"
                );
                if let Err(abandon_err) = self.orders.mark_abandoned(order.id).await {
                    tracing::error!(
                        order_id = %order.id,
                        error = %abandon_err,
                        "Failed to mark order abandoned"
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(
            order_id = %order.id,
            session_id = %session.id,
            "Checkout session created"
        );

        Ok(StartCheckoutResult {
            order,
            redirect_url: session.url,
        })
    }
}
