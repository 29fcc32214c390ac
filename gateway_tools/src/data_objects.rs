use serde::{Deserialize, Serialize};

/// A payment intent as returned by the gateway's order-creation endpoint. The `id` is what the client-side checkout
/// widget needs to collect the payment, and what later callbacks reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Amount in minor units (paise)
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundNotes {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequestBody {
    pub amount: i64,
    pub speed: String,
    pub notes: RefundNotes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundResponse {
    pub id: String,
    pub payment_id: String,
    pub amount: i64,
    pub status: String,
}

/// Error envelope used by the gateway for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorBody {
    #[serde(default)]
    pub error: GatewayErrorDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}
