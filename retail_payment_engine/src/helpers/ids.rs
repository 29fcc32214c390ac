use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::db_types::OrderId;

static PAYMENT_REFERENCE: OnceLock<Regex> = OnceLock::new();

/// Order ids are UUIDv4. Together with the UNIQUE constraint on the orders table this makes collisions a hard
/// error instead of a silent overwrite.
pub fn new_order_id() -> OrderId {
    OrderId(Uuid::new_v4().to_string())
}

pub fn new_refund_id() -> String {
    format!("rfnd_{}", Uuid::new_v4().simple())
}

pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Human-facing invoice reference: date prefix for filing, random suffix for uniqueness.
pub fn new_invoice_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("INV-{}-{suffix}", now.format("%Y%m%d"))
}

/// Whether `payment_id` has the shape the gateway assigns to payment references. Refunds against anything else
/// are rejected locally instead of being sent to the gateway.
pub fn is_gateway_payment_reference(payment_id: &str) -> bool {
    let re = PAYMENT_REFERENCE.get_or_init(|| Regex::new(r"^pay_[A-Za-z0-9]{10,}$").unwrap());
    re.is_match(payment_id)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payment_reference_shapes() {
        assert!(is_gateway_payment_reference("pay_MkWab1234567890"));
        assert!(is_gateway_payment_reference("pay_0123456789"));
        assert!(!is_gateway_payment_reference("xyz123"));
        assert!(!is_gateway_payment_reference("pay_short"));
        assert!(!is_gateway_payment_reference("pay_has spaces 123"));
        assert!(!is_gateway_payment_reference(""));
    }

    #[test]
    fn invoice_number_format() {
        let now = "2026-08-30T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let inv = new_invoice_number(now);
        assert!(inv.starts_with("INV-20260830-"));
        assert_eq!(inv.len(), "INV-20260830-".len() + 8);
    }

    #[test]
    fn order_ids_are_unique() {
        let a = new_order_id();
        let b = new_order_id();
        assert_ne!(a, b);
    }
}
