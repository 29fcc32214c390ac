use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    data_objects::GatewayErrorBody,
    GatewayApiError,
    GatewayConfig,
    PaymentIntent,
    RefundNotes,
    RefundRequestBody,
    RefundResponse,
};

#[derive(Clone)]
pub struct GatewayApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl GatewayApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        let url = self.url(path);
        trace!("Sending gateway request: {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayApiError::Timeout
            } else {
                GatewayApiError::RequestError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("Gateway request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let description = match response.json::<GatewayErrorBody>().await {
                Ok(body) if !body.error.description.is_empty() => body.error.description,
                _ => "Payment gateway rejected the request".to_string(),
            };
            Err(GatewayApiError::GatewayError { status, description })
        }
    }

    /// Creates a payment intent for `amount` minor units. The returned intent id must be attached to the local
    /// order so that the settlement callback can be matched back to it.
    pub async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<PaymentIntent, GatewayApiError> {
        debug!("Creating payment intent for {amount} minor units ({currency}), receipt {receipt}");
        let body = serde_json::json!({
            "amount": amount,
            "currency": currency,
            "receipt": receipt,
        });
        let intent = self.rest_query::<PaymentIntent, Value>(Method::POST, "/orders", Some(body)).await?;
        info!("Created payment intent {} for receipt {receipt}", intent.id);
        Ok(intent)
    }

    /// Executes a full refund of `payment_id` at normal speed, annotating the gateway record with the reason.
    pub async fn refund_payment(
        &self,
        payment_id: &str,
        amount: i64,
        reason: &str,
    ) -> Result<RefundResponse, GatewayApiError> {
        debug!("Requesting refund of {amount} minor units against payment {payment_id}");
        let body = RefundRequestBody {
            amount,
            speed: "normal".to_string(),
            notes: RefundNotes { reason: reason.to_string() },
        };
        let path = format!("/payments/{payment_id}/refund");
        let refund = self.rest_query::<RefundResponse, RefundRequestBody>(Method::POST, &path, Some(body)).await?;
        info!("Gateway accepted refund {} for payment {payment_id}", refund.id);
        Ok(refund)
    }
}
