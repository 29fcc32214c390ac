use rpg_common::Money;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{LineItem, Order, PaymentMethod},
    traits::GatewayIntent,
};

/// Everything the storefront sends when a customer places an order. `total` is the tax-inclusive amount the
/// customer sees; the engine derives the GST breakdown from it rather than trusting a client-side split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_id: String,
    pub items: Vec<LineItem>,
    pub total: Money,
    /// Buyer's state for GST jurisdiction. Absent or blank means the seller's own state.
    #[serde(default)]
    pub buyer_state: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    rpg_common::INR_CURRENCY_CODE.to_string()
}

/// The outcome of a checkout. `gateway` is populated for online orders only; the client completes payment
/// against it and the settlement callback closes the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub order: Order,
    pub gateway: Option<GatewayIntent>,
}
