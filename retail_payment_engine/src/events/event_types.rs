use serde::{Deserialize, Serialize};

use crate::db_types::{Order, RefundRecord};

/// A COD order was placed, or an online order finished checkout. Subscribers typically render the order
/// confirmation and notify the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order: Order,
}

impl OrderPlacedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// A gateway settlement callback passed signature verification and the order moved to `Processing`.
/// Published exactly once per order; duplicate callbacks are absorbed before this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerifiedEvent {
    pub order: Order,
}

impl PaymentVerifiedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// A refund reached a terminal outcome and a ledger entry was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundSettledEvent {
    pub order: Order,
    pub record: RefundRecord,
}

impl RefundSettledEvent {
    pub fn new(order: Order, record: RefundRecord) -> Self {
        Self { order, record }
    }
}
