//! Shared plumbing for the integration tests: a throwaway SQLite database per test, a mock payment gateway,
//! and builders for the request objects the tests pass around.
#![allow(dead_code)]

use mockall::mock;
use retail_payment_engine::{
    create_database_if_missing,
    db_types::{LineItem, PaymentMethod},
    helpers::{TaxCalculator, DEFAULT_GST_RATE_BPS},
    run_migrations,
    traits::{GatewayIntent, GatewayRefund, PaymentEngineError, PaymentProvider},
    CheckoutRequest,
    SqliteDatabase,
};
use rpg_common::{Money, Secret, INR_CURRENCY_CODE};
use tempfile::TempDir;

pub const WEBHOOK_SECRET: &str = "whsec_integration_test_secret";
pub const SELLER_STATE: &str = "Maharashtra";

mock! {
    pub Gateway {}
    impl PaymentProvider for Gateway {
        async fn create_intent(&self, amount: Money, currency: &str, receipt: &str) -> Result<GatewayIntent, PaymentEngineError>;
        async fn refund(&self, payment_id: &str, amount: Money, reason: &str) -> Result<GatewayRefund, PaymentEngineError>;
    }
}

/// Fresh file-backed database with the schema applied. The TempDir must outlive the database.
pub async fn new_db() -> (TempDir, SqliteDatabase) {
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let url = format!("sqlite://{}/retail_store.db", dir.path().display());
    create_database_if_missing(&url).await.expect("Could not create database");
    let db = SqliteDatabase::new_with_url(&url, 25).await.expect("Could not connect to database");
    run_migrations(db.pool()).await.expect("Error running DB migrations");
    (dir, db)
}

pub fn tax_calculator() -> TaxCalculator {
    TaxCalculator::new(DEFAULT_GST_RATE_BPS, SELLER_STATE)
}

pub fn webhook_secret() -> Secret<String> {
    Secret::new(WEBHOOK_SECRET.to_string())
}

pub fn test_items() -> Vec<LineItem> {
    vec![
        LineItem {
            name: "Wayfarer frame".to_string(),
            unit_price: Money::from_rupees(2_000),
            quantity: 1,
            addon_price: Some(Money::from_rupees(1_500)),
        },
        LineItem { name: "Lens cleaning kit".to_string(), unit_price: Money::from_rupees(250), quantity: 2, addon_price: None },
    ]
}

pub fn checkout_request(method: PaymentMethod, buyer_state: Option<&str>) -> CheckoutRequest {
    CheckoutRequest {
        customer_id: "cust_001".to_string(),
        items: test_items(),
        total: Money::from_rupees(4_000),
        buyer_state: buyer_state.map(String::from),
        payment_method: method,
        currency: INR_CURRENCY_CODE.to_string(),
    }
}

pub fn intent_for(gateway_order_id: &str, amount: Money) -> GatewayIntent {
    GatewayIntent { gateway_order_id: gateway_order_id.to_string(), amount, currency: INR_CURRENCY_CODE.to_string() }
}

pub fn gateway_refund_ok(reference: &str) -> GatewayRefund {
    GatewayRefund { refund_reference: reference.to_string(), status: "processed".to_string() }
}
