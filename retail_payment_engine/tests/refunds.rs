mod common;

use common::*;
use retail_payment_engine::{
    db_types::{AdminActor, OrderId, OrderStatusType, PaymentMethod, RefundDecision, RefundStatusType, RefundType},
    events::EventProducers,
    helpers::sign_callback,
    traits::{AuditLog, OrderManagement, PaymentEngineError, RefundLedger},
    OrderFlowApi,
    RefundApi,
    SqliteDatabase,
};

fn admin() -> AdminActor {
    AdminActor::new("admin_alice", "Alice")
}

fn refund_api(db: SqliteDatabase, gateway: MockGateway) -> RefundApi<SqliteDatabase, MockGateway> {
    RefundApi::new(db, gateway, EventProducers::default())
}

/// Places a COD order and returns its id.
async fn place_cod_order(db: &SqliteDatabase) -> OrderId {
    let api = OrderFlowApi::new(
        db.clone(),
        MockGateway::new(),
        tax_calculator(),
        webhook_secret(),
        EventProducers::default(),
    );
    let result = api.checkout(checkout_request(PaymentMethod::Cod, None)).await.unwrap();
    result.order.order_id
}

/// Places an online order and settles it with payment reference `payment_id`, returning the order id.
async fn place_settled_online_order(db: &SqliteDatabase, gateway_order_id: &str, payment_id: &str) -> OrderId {
    let mut gateway = MockGateway::new();
    let gw_id = gateway_order_id.to_string();
    gateway.expect_create_intent().returning(move |amount, _, _| Ok(intent_for(&gw_id, amount)));
    let api = OrderFlowApi::new(db.clone(), gateway, tax_calculator(), webhook_secret(), EventProducers::default());
    api.checkout(checkout_request(PaymentMethod::Online, None)).await.unwrap();
    let signature = sign_callback(gateway_order_id, payment_id, WEBHOOK_SECRET);
    let order = api.verify_payment(gateway_order_id, payment_id, &signature).await.unwrap();
    order.order_id
}

#[tokio::test]
async fn refunds_cannot_be_requested_for_unpaid_orders() {
    let (_dir, db) = new_db().await;
    let mut gateway = MockGateway::new();
    gateway.expect_create_intent().returning(|amount, _, _| Ok(intent_for("order_GW0101", amount)));
    let flow = OrderFlowApi::new(db.clone(), gateway, tax_calculator(), webhook_secret(), EventProducers::default());
    let placed = flow.checkout(checkout_request(PaymentMethod::Online, None)).await.unwrap();

    let api = refund_api(db.clone(), MockGateway::new());
    // Still Pending: never paid for
    let err = api.request_refund(&placed.order.order_id, "changed my mind").await.unwrap_err();
    assert!(matches!(err, PaymentEngineError::InvalidState(_)));
    // Unknown order
    let err = api.request_refund(&OrderId("no-such-order".to_string()), "whatever").await.unwrap_err();
    assert!(matches!(err, PaymentEngineError::NotFound(_)));
}

#[tokio::test]
async fn duplicate_refund_requests_are_rejected() {
    let (_dir, db) = new_db().await;
    let order_id = place_cod_order(&db).await;
    let api = refund_api(db.clone(), MockGateway::new());

    let order = api.request_refund(&order_id, "wrong prescription").await.unwrap();
    assert_eq!(order.refund_status, RefundStatusType::Requested);
    assert_eq!(order.refund_reason.as_deref(), Some("wrong prescription"));

    let err = api.request_refund(&order_id, "asking again").await.unwrap_err();
    assert!(matches!(err, PaymentEngineError::InvalidState(_)));
}

#[tokio::test]
async fn approved_cod_refund_writes_ledger_and_audit() {
    let (_dir, db) = new_db().await;
    let order_id = place_cod_order(&db).await;
    let mut gateway = MockGateway::new();
    gateway.expect_refund().times(0);
    let api = refund_api(db.clone(), gateway);

    api.request_refund(&order_id, "frame arrived cracked").await.unwrap();
    let order = api.decide_refund(&order_id, RefundDecision::Approve, &admin(), None).await.unwrap();
    assert_eq!(order.status, OrderStatusType::Refunded);
    assert_eq!(order.refund_status, RefundStatusType::Refunded);

    let ledger = db.fetch_refunds_for_order(&order_id).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].refund_type, RefundType::CodManual);
    assert_eq!(ledger[0].status, RefundStatusType::Refunded);
    assert_eq!(ledger[0].amount, order.total_price);

    let audit = db.fetch_recent_audit(10).await.unwrap();
    assert!(audit.iter().any(|e| e.action == "REFUND_APPROVED_COD" && e.admin_id == "admin_alice"));
}

#[tokio::test]
async fn rejected_refunds_may_be_requested_again() {
    let (_dir, db) = new_db().await;
    let order_id = place_cod_order(&db).await;
    let api = refund_api(db.clone(), MockGateway::new());

    api.request_refund(&order_id, "too big").await.unwrap();
    let order =
        api.decide_refund(&order_id, RefundDecision::Reject, &admin(), Some("outside return window")).await.unwrap();
    assert_eq!(order.refund_status, RefundStatusType::Rejected);
    assert_eq!(order.failure_reason.as_deref(), Some("outside return window"));
    assert!(db.fetch_refunds_for_order(&order_id).await.unwrap().is_empty());

    // A rejection is not terminal for the customer
    let order = api.request_refund(&order_id, "second attempt with photos").await.unwrap();
    assert_eq!(order.refund_status, RefundStatusType::Requested);
}

#[tokio::test]
async fn malformed_payment_reference_never_reaches_the_gateway() {
    let (_dir, db) = new_db().await;
    // Settle with a reference that does not match the gateway's pay_* shape
    let order_id = place_settled_online_order(&db, "order_GW0102", "bogus_reference").await;
    let mut gateway = MockGateway::new();
    gateway.expect_refund().times(0);
    let api = refund_api(db.clone(), gateway);

    api.request_refund(&order_id, "dead on arrival").await.unwrap();
    let err = api.decide_refund(&order_id, RefundDecision::Approve, &admin(), None).await.unwrap_err();
    assert!(matches!(err, PaymentEngineError::InvalidState(_)));

    let order = db.fetch_order_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.refund_status, RefundStatusType::Failed);
    assert_eq!(order.failure_reason.as_deref(), Some("Invalid payment reference"));
    let ledger = db.fetch_refunds_for_order(&order_id).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].refund_type, RefundType::OnlineAuto);
    assert_eq!(ledger[0].status, RefundStatusType::Failed);
}

#[tokio::test]
async fn gateway_refund_failure_is_recorded_then_surfaced() {
    let (_dir, db) = new_db().await;
    let order_id = place_settled_online_order(&db, "order_GW0103", "pay_Settled0103").await;
    let mut gateway = MockGateway::new();
    gateway.expect_refund().times(1).returning(|_, _, _| {
        Err(PaymentEngineError::GatewayError { description: "refund already attempted".to_string(), status_code: 400 })
    });
    let api = refund_api(db.clone(), gateway);

    api.request_refund(&order_id, "lens scratched").await.unwrap();
    let err = api.decide_refund(&order_id, RefundDecision::Approve, &admin(), None).await.unwrap_err();
    assert!(matches!(err, PaymentEngineError::GatewayError { status_code: 400, .. }));

    let order = db.fetch_order_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.refund_status, RefundStatusType::Failed);
    assert_eq!(order.failure_reason.as_deref(), Some("refund already attempted"));
    let ledger = db.fetch_refunds_for_order(&order_id).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].status, RefundStatusType::Failed);

    // A failed attempt can be retried end to end
    api.request_refund(&order_id, "lens scratched, retry").await.unwrap();
    let mut gateway = MockGateway::new();
    gateway.expect_refund().times(1).returning(|_, _, _| Ok(gateway_refund_ok("rfnd_gw_0103")));
    let api = refund_api(db.clone(), gateway);
    let order = api.decide_refund(&order_id, RefundDecision::Approve, &admin(), None).await.unwrap();
    assert_eq!(order.status, OrderStatusType::Refunded);
    assert_eq!(order.refund_status, RefundStatusType::Refunded);
    assert_eq!(db.fetch_refunds_for_order(&order_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn successful_online_refund_settles_the_order() {
    let (_dir, db) = new_db().await;
    let order_id = place_settled_online_order(&db, "order_GW0104", "pay_Settled0104").await;
    let mut gateway = MockGateway::new();
    gateway.expect_refund().times(1).returning(|_, _, _| Ok(gateway_refund_ok("rfnd_gw_0104")));
    let api = refund_api(db.clone(), gateway);

    api.request_refund(&order_id, "wrong colour").await.unwrap();
    let order = api.decide_refund(&order_id, RefundDecision::Approve, &admin(), None).await.unwrap();
    assert_eq!(order.status, OrderStatusType::Refunded);
    assert_eq!(order.refund_status, RefundStatusType::Refunded);

    let ledger = db.fetch_refunds_for_order(&order_id).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].refund_type, RefundType::OnlineAuto);
    assert_eq!(ledger[0].status, RefundStatusType::Refunded);
    assert_eq!(ledger[0].payment_id.as_deref(), Some("pay_Settled0104"));

    // The decision is terminal
    let err = api.decide_refund(&order_id, RefundDecision::Approve, &admin(), None).await.unwrap_err();
    assert!(matches!(err, PaymentEngineError::InvalidState(_)));
}
