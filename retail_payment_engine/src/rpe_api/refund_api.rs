use chrono::Utc;
use log::*;

use crate::{
    db_types::{
        AdminActor,
        NewRefundRecord,
        Order,
        OrderId,
        OrderStatusType,
        OrderUpdate,
        PaymentMethod,
        RefundDecision,
        RefundRecord,
        RefundStatusType,
        RefundType,
    },
    events::{EventProducers, RefundSettledEvent},
    helpers::{is_gateway_payment_reference, new_refund_id},
    traits::{AuditLog, OrderManagement, PaymentEngineError, PaymentProvider, RefundLedger},
};

/// The two-step refund workflow: a customer (or support agent) requests, an admin decides.
///
/// Every decision leaves exactly one audit entry, and every terminal outcome (refunded or failed attempt)
/// leaves exactly one write-once ledger row. The order writes are version-checked, so two admins deciding the
/// same refund concurrently cannot both land.
pub struct RefundApi<B, P> {
    db: B,
    provider: P,
    producers: EventProducers,
}

impl<B, P> RefundApi<B, P>
where
    B: OrderManagement + RefundLedger + AuditLog,
    P: PaymentProvider,
{
    pub fn new(db: B, provider: P, producers: EventProducers) -> Self {
        Self { db, provider, producers }
    }

    /// Marks an order as awaiting a refund decision. Rejected and failed refunds may be re-requested; an order
    /// that was never paid for, or whose refund is already in flight or complete, cannot.
    pub async fn request_refund(&self, order_id: &OrderId, reason: &str) -> Result<Order, PaymentEngineError> {
        let order =
            self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| PaymentEngineError::not_found(order_id))?;
        if !order.status.is_refundable() {
            return Err(PaymentEngineError::invalid_state(format!(
                "Order {} cannot be refunded from status {}",
                order.order_id, order.status
            )));
        }
        if !order.refund_status.allows_new_request() {
            return Err(PaymentEngineError::invalid_state(format!(
                "A refund for order {} is already {}",
                order.order_id, order.refund_status
            )));
        }
        let update = OrderUpdate::default()
            .with_refund_status(RefundStatusType::Requested)
            .with_refund_reason(reason)
            .with_refund_date(Utc::now());
        let order = self.db.update_order_financial(order_id, order.version, update).await?;
        info!("💸️ Refund requested for order {}: {reason}", order.order_id);
        Ok(order)
    }

    /// Resolves a pending refund request. See the member functions for the individual branches; this is the
    /// dispatch point and holds the shared guards.
    pub async fn decide_refund(
        &self,
        order_id: &OrderId,
        decision: RefundDecision,
        admin: &AdminActor,
        note: Option<&str>,
    ) -> Result<Order, PaymentEngineError> {
        let order =
            self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| PaymentEngineError::not_found(order_id))?;
        if order.refund_status != RefundStatusType::Requested {
            return Err(PaymentEngineError::invalid_state(format!(
                "Order {} has no refund awaiting a decision (refund status: {})",
                order.order_id, order.refund_status
            )));
        }
        match decision {
            RefundDecision::Reject => self.reject(order, admin, note).await,
            RefundDecision::Approve => match order.payment_method {
                PaymentMethod::Cod => self.settle_cod(order, admin).await,
                PaymentMethod::Online => self.settle_online(order, admin).await,
            },
        }
    }

    async fn reject(&self, order: Order, admin: &AdminActor, note: Option<&str>) -> Result<Order, PaymentEngineError> {
        let note = note.unwrap_or("No reason given");
        let update =
            OrderUpdate::default().with_refund_status(RefundStatusType::Rejected).with_failure_reason(note);
        let order = self.db.update_order_financial(&order.order_id, order.version, update).await?;
        self.audit(admin, "REFUND_REJECTED", &format!("Order {}: {note}", order.order_id)).await;
        info!("💸️ Refund for order {} rejected by {}: {note}", order.order_id, admin.name);
        Ok(order)
    }

    /// COD money is handed back over the counter; the engine only records that it happened.
    async fn settle_cod(&self, order: Order, admin: &AdminActor) -> Result<Order, PaymentEngineError> {
        let update = OrderUpdate::default()
            .with_status(OrderStatusType::Refunded)
            .with_refund_status(RefundStatusType::Refunded)
            .with_refund_date(Utc::now());
        let order = self.db.update_order_financial(&order.order_id, order.version, update).await?;
        let record = self
            .db
            .insert_refund_record(NewRefundRecord {
                refund_id: new_refund_id(),
                order_id: order.order_id.clone(),
                payment_id: order.payment_id.clone(),
                amount: order.total_price,
                status: RefundStatusType::Refunded,
                refund_type: RefundType::CodManual,
            })
            .await?;
        self.audit(admin, "REFUND_APPROVED_COD", &format!("Order {}: {} returned manually", order.order_id, order.total_price))
            .await;
        info!("💸️ COD refund of {} recorded for order {}", order.total_price, order.order_id);
        self.publish_settled(&order, &record).await;
        Ok(order)
    }

    async fn settle_online(&self, order: Order, admin: &AdminActor) -> Result<Order, PaymentEngineError> {
        let Some(payment_id) = order.payment_id.clone() else {
            self.audit(admin, "REFUND_APPROVE_FAILED", &format!("Order {}: no payment reference on file", order.order_id))
                .await;
            return Err(PaymentEngineError::invalid_state(format!(
                "Order {} has no payment reference to refund against",
                order.order_id
            )));
        };
        if !is_gateway_payment_reference(&payment_id) {
            warn!("💸️ Refusing to send malformed payment reference for order {} to the gateway", order.order_id);
            let order = self.mark_failed(&order, "Invalid payment reference").await?;
            self.record_failed_attempt(&order, Some(payment_id)).await?;
            self.audit(admin, "REFUND_APPROVE_FAILED", &format!("Order {}: invalid payment reference", order.order_id))
                .await;
            return Err(PaymentEngineError::invalid_state(format!(
                "Refund for order {} failed: invalid payment reference",
                order.order_id
            )));
        }
        let reason = order.refund_reason.clone().unwrap_or_else(|| "Customer refund".to_string());
        match self.provider.refund(&payment_id, order.total_price, &reason).await {
            Ok(gw_refund) => {
                let update = OrderUpdate::default()
                    .with_status(OrderStatusType::Refunded)
                    .with_refund_status(RefundStatusType::Refunded)
                    .with_refund_date(Utc::now());
                let order = self.db.update_order_financial(&order.order_id, order.version, update).await?;
                let record = self
                    .db
                    .insert_refund_record(NewRefundRecord {
                        refund_id: new_refund_id(),
                        order_id: order.order_id.clone(),
                        payment_id: Some(payment_id),
                        amount: order.total_price,
                        status: RefundStatusType::Refunded,
                        refund_type: RefundType::OnlineAuto,
                    })
                    .await?;
                self.audit(
                    admin,
                    "REFUND_APPROVED_ONLINE",
                    &format!("Order {}: {} refunded via gateway ({})", order.order_id, order.total_price, gw_refund.refund_reference),
                )
                .await;
                info!("💸️ Gateway refund {} settled for order {}", gw_refund.refund_reference, order.order_id);
                self.publish_settled(&order, &record).await;
                Ok(order)
            },
            Err(e) => {
                // The failed attempt is recorded before the error is surfaced, so the ledger and the order
                // both show what was tried even when the caller only sees a 502.
                let description = match &e {
                    PaymentEngineError::GatewayError { description, .. } => description.clone(),
                    other => other.to_string(),
                };
                error!("💸️ Gateway refund for order {} failed: {description}", order.order_id);
                let order = self.mark_failed(&order, &description).await?;
                self.record_failed_attempt(&order, Some(payment_id)).await?;
                self.audit(admin, "REFUND_APPROVE_FAILED", &format!("Order {}: {description}", order.order_id)).await;
                Err(e)
            },
        }
    }

    async fn mark_failed(&self, order: &Order, reason: &str) -> Result<Order, PaymentEngineError> {
        let update =
            OrderUpdate::default().with_refund_status(RefundStatusType::Failed).with_failure_reason(reason);
        self.db.update_order_financial(&order.order_id, order.version, update).await
    }

    async fn record_failed_attempt(
        &self,
        order: &Order,
        payment_id: Option<String>,
    ) -> Result<RefundRecord, PaymentEngineError> {
        let record = self
            .db
            .insert_refund_record(NewRefundRecord {
                refund_id: new_refund_id(),
                order_id: order.order_id.clone(),
                payment_id,
                amount: order.total_price,
                status: RefundStatusType::Failed,
                refund_type: RefundType::OnlineAuto,
            })
            .await?;
        Ok(record)
    }

    async fn publish_settled(&self, order: &Order, record: &RefundRecord) {
        for producer in &self.producers.refund_settled_producer {
            producer.publish_event(RefundSettledEvent::new(order.clone(), record.clone())).await;
        }
    }

    /// The workflow must not abort because the audit write failed, but a silent gap in the audit trail is
    /// worth shouting about in the logs.
    async fn audit(&self, admin: &AdminActor, action: &str, details: &str) {
        if let Err(e) = self.db.append_audit(&admin.id, action, details).await {
            error!("💸️ Could not write audit entry [{action}] {details}: {e}");
        }
    }

    pub async fn refund_history(&self, order_id: &OrderId) -> Result<Vec<RefundRecord>, PaymentEngineError> {
        self.db.fetch_refunds_for_order(order_id).await
    }
}
