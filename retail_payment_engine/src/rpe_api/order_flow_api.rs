use chrono::Utc;
use log::*;
use rpg_common::Secret;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType, OrderUpdate, PaymentMethod},
    events::{EventProducers, OrderPlacedEvent, PaymentVerifiedEvent},
    helpers::{new_invoice_number, new_order_id, verify_callback, TaxCalculator},
    rpe_api::{CheckoutRequest, CheckoutResult},
    traits::{AnalyticsStore, OrderManagement, PaymentEngineError, PaymentProvider},
};

/// `OrderFlowApi` handles the main checkout and payment-settlement flows of the engine.
///
/// Checkout computes the GST breakdown, reserves a gateway intent for online orders, and persists the order.
/// Settlement verification is the only path that moves money-state forward: the callback signature is checked
/// first, and the `Pending -> Processing` flip happens in a single conditioned statement so that duplicate
/// callbacks and racing transitions are absorbed rather than double-counted.
pub struct OrderFlowApi<B, P> {
    db: B,
    provider: P,
    tax: TaxCalculator,
    webhook_secret: Secret<String>,
    producers: EventProducers,
}

impl<B, P> OrderFlowApi<B, P>
where
    B: OrderManagement + AnalyticsStore,
    P: PaymentProvider,
{
    pub fn new(
        db: B,
        provider: P,
        tax: TaxCalculator,
        webhook_secret: Secret<String>,
        producers: EventProducers,
    ) -> Self {
        Self { db, provider, tax, webhook_secret, producers }
    }

    /// Places an order. COD orders are persisted immediately as `CodPending`. Online orders first reserve a
    /// payment intent at the gateway; if the gateway call fails, nothing is persisted and the error is
    /// surfaced, so there are no orphan `Pending` orders with no intent behind them.
    pub async fn checkout(&self, req: CheckoutRequest) -> Result<CheckoutResult, PaymentEngineError> {
        if !req.total.is_positive() {
            return Err(PaymentEngineError::InvalidAmount);
        }
        let tax = self.tax.calculate(req.total, req.buyer_state.as_deref());
        let order_id = new_order_id();
        let invoice_number = new_invoice_number(Utc::now());
        let mut new_order = NewOrder {
            order_id: order_id.clone(),
            invoice_number: Some(invoice_number),
            gateway_order_id: None,
            customer_id: req.customer_id,
            items: req.items,
            total_price: req.total,
            tax,
            currency: req.currency.clone(),
            payment_method: req.payment_method,
            status: OrderStatusType::CodPending,
        };
        let gateway = match req.payment_method {
            PaymentMethod::Cod => None,
            PaymentMethod::Online => {
                let intent = self.provider.create_intent(req.total, &req.currency, order_id.as_str()).await?;
                new_order.gateway_order_id = Some(intent.gateway_order_id.clone());
                new_order.status = OrderStatusType::Pending;
                Some(intent)
            },
        };
        let order = self.db.insert_order(new_order).await?;
        info!("🛒️ Order {} placed. {} via {}", order.order_id, order.total_price, order.payment_method);
        // COD revenue counts at placement; online revenue counts when the settlement callback lands.
        if order.payment_method == PaymentMethod::Cod {
            self.record_payment_analytics(&order).await;
        }
        for producer in &self.producers.order_placed_producer {
            producer.publish_event(OrderPlacedEvent::new(order.clone())).await;
        }
        Ok(CheckoutResult { order, gateway })
    }

    /// Verifies a gateway settlement callback and, on first delivery, flips the order to `Processing`.
    ///
    /// An unknown gateway order id and a bad signature both come back as the opaque
    /// [`PaymentEngineError::VerificationFailed`]; the distinction is logged but never told to the caller, so
    /// a probe cannot learn which order ids exist. A replayed callback for an already-settled order returns
    /// the order again without touching analytics or firing notifications a second time.
    pub async fn verify_payment(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<Order, PaymentEngineError> {
        let Some(order) = self.db.fetch_order_by_gateway_id(gateway_order_id).await? else {
            warn!("🛒️ Payment callback for unknown gateway order {gateway_order_id}");
            return Err(PaymentEngineError::VerificationFailed);
        };
        if !verify_callback(gateway_order_id, gateway_payment_id, signature, self.webhook_secret.reveal()) {
            warn!("🛒️ Signature mismatch on payment callback for order {}", order.order_id);
            let update = OrderUpdate::default()
                .with_status(OrderStatusType::Failed)
                .with_failure_reason("Signature Mismatch");
            // Conditioned on Pending so a stray late callback cannot fail an order that already settled.
            let _ = self.db.transition_status(&order.order_id, &[OrderStatusType::Pending], update).await?;
            return Err(PaymentEngineError::VerificationFailed);
        }
        let update = OrderUpdate::default()
            .with_status(OrderStatusType::Processing)
            .with_payment_id(gateway_payment_id);
        match self.db.transition_status(&order.order_id, &[OrderStatusType::Pending], update).await? {
            Some(updated) => {
                info!("🛒️ Payment verified for order {}. {} received", updated.order_id, updated.total_price);
                self.record_payment_analytics(&updated).await;
                for producer in &self.producers.payment_verified_producer {
                    producer.publish_event(PaymentVerifiedEvent::new(updated.clone())).await;
                }
                Ok(updated)
            },
            None => {
                // Lost the conditioned write. A duplicate delivery of the same settlement is fine; anything
                // else means the order is no longer payable.
                let current = self
                    .db
                    .fetch_order_by_id(&order.order_id)
                    .await?
                    .ok_or_else(|| PaymentEngineError::not_found(&order.order_id))?;
                if current.status == OrderStatusType::Processing &&
                    current.payment_id.as_deref() == Some(gateway_payment_id)
                {
                    debug!("🛒️ Duplicate payment callback for order {} absorbed", current.order_id);
                    Ok(current)
                } else {
                    Err(PaymentEngineError::invalid_state(format!(
                        "Order {} is not awaiting payment (status: {})",
                        current.order_id, current.status
                    )))
                }
            },
        }
    }

    /// Analytics must never break a payment that has already settled, so failures are logged and swallowed.
    async fn record_payment_analytics(&self, order: &Order) {
        let date = Utc::now().date_naive();
        if let Err(e) = self.db.increment_daily(date, order.total_price, order.payment_method).await {
            error!("🛒️ Could not record analytics for order {}: {e}", order.order_id);
        }
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentEngineError> {
        self.db.fetch_order_by_id(order_id).await
    }

    pub async fn fetch_all_orders(&self) -> Result<Vec<Order>, PaymentEngineError> {
        self.db.fetch_all_orders().await
    }

    pub async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, PaymentEngineError> {
        self.db.fetch_orders_for_customer(customer_id).await
    }
}
