//! Stripe API wire types.
//!
//! These types represent Stripe checkout-session objects as returned by
//! the REST API. Only fields relevant to our processing are captured.

use std::collections::HashMap;

use serde::Deserialize;

/// Checkout session object from the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSession {
    /// Session id (cs_xxx format).
    pub id: String,

    /// Hosted checkout URL. Present on freshly created sessions.
    #[serde(default)]
    pub url: Option<String>,

    /// Metadata attached at creation time.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Payment intent id, present once payment has been taken.
    #[serde(default)]
    pub payment_intent: Option<String>,

    /// Total charged, in minor currency units.
    #[serde(default)]
    pub amount_total: Option<i64>,
}
