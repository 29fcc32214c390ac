use rpg_common::Money;
use serde::{Deserialize, Serialize};

use crate::traits::PaymentEngineError;

/// A payment intent created at the gateway. The client-side checkout widget completes the payment against
/// `gateway_order_id`; the settlement callback references the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayIntent {
    pub gateway_order_id: String,
    pub amount: Money,
    pub currency: String,
}

/// The gateway's acknowledgement of an executed refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRefund {
    pub refund_reference: String,
    pub status: String,
}

/// The external payment processor, as seen by the engine. Implementations must bound every call with a timeout
/// and surface failures as [`PaymentEngineError::GatewayError`]; the engine never retries on its own.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Create a payment intent for `amount` (tax-inclusive, minor units) referencing `receipt`.
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayIntent, PaymentEngineError>;

    /// Execute a full refund of `payment_id` at normal speed, annotated with `reason`.
    async fn refund(&self, payment_id: &str, amount: Money, reason: &str)
        -> Result<GatewayRefund, PaymentEngineError>;
}
