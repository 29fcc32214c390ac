use gateway_tools::{GatewayApi, GatewayApiError, GatewayConfig};
use retail_payment_engine::traits::{GatewayIntent, GatewayRefund, PaymentEngineError, PaymentProvider};
use rpg_common::Money;

use crate::errors::ServerError;

/// Adapts the standalone gateway REST client to the engine's [`PaymentProvider`] contract.
#[derive(Clone)]
pub struct GatewayProvider {
    api: GatewayApi,
}

impl GatewayProvider {
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let api = GatewayApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

fn to_engine_error(e: GatewayApiError) -> PaymentEngineError {
    PaymentEngineError::GatewayError { description: e.description(), status_code: e.status_code() }
}

impl PaymentProvider for GatewayProvider {
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayIntent, PaymentEngineError> {
        let intent = self.api.create_intent(amount.value(), currency, receipt).await.map_err(to_engine_error)?;
        Ok(GatewayIntent {
            gateway_order_id: intent.id,
            amount: Money::from_paise(intent.amount),
            currency: intent.currency,
        })
    }

    async fn refund(
        &self,
        payment_id: &str,
        amount: Money,
        reason: &str,
    ) -> Result<GatewayRefund, PaymentEngineError> {
        let refund = self.api.refund_payment(payment_id, amount.value(), reason).await.map_err(to_engine_error)?;
        Ok(GatewayRefund { refund_reference: refund.id, status: refund.status })
    }
}
