use actix_web::http::StatusCode;
use retail_payment_engine::{db_types::Role, traits::AuthManagement};
use serde_json::json;

use crate::endpoint_tests::helpers::*;

#[actix_web::test]
async fn admin_routes_reject_customers() {
    let (_dir, db) = test_db().await;
    let token = customer_token("cust_200");
    for path in ["/api/orders", "/api/approvals/pending", "/api/audit"] {
        let (status, _) = get(db.clone(), path, Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path} should be admin-only");
    }
}

#[actix_web::test]
async fn an_admin_claim_without_a_live_role_is_rejected() {
    let (_dir, db) = test_db().await;
    // Token claims Admin, but the roles table has never heard of them
    let token = admin_token("admin_ghost");
    let (status, _) = get(db, "/api/orders", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admins_with_live_roles_can_use_the_admin_surface() {
    let (_dir, db) = test_db().await;
    db.assign_role("admin_300", Role::Admin).await.unwrap();
    let token = admin_token("admin_300");

    let (status, body) = get(db.clone(), "/api/orders", Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");

    let (status, body) = get(db, "/api/audit?limit=10", Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
}

#[actix_web::test]
async fn cod_refunds_work_end_to_end_over_http() {
    let (_dir, db) = test_db().await;
    db.assign_role("admin_400", Role::Admin).await.unwrap();
    let customer = customer_token("cust_400");
    let admin = admin_token("admin_400");

    let (_, body) = post(db.clone(), "/api/orders", Some(&customer), cod_checkout_body()).await;
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    let order_id = value["order"]["order_id"].as_str().unwrap().to_string();

    let (status, _) =
        post(db.clone(), &format!("/api/orders/{order_id}/refund"), Some(&customer), json!({"reason": "hinge broke"}))
            .await;
    assert_eq!(status, StatusCode::OK);

    // A customer cannot decide their own refund
    let (status, _) = post(
        db.clone(),
        &format!("/api/orders/{order_id}/refund/decision"),
        Some(&customer),
        json!({"decision": "Approve"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post(
        db.clone(),
        &format!("/api/orders/{order_id}/refund/decision"),
        Some(&admin),
        json!({"decision": "Approve"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["status"], "Refunded");
    assert_eq!(value["refund_status"], "Refunded");

    // Deciding again is a client error, not a second refund
    let (status, _) = post(
        db,
        &format!("/api/orders/{order_id}/refund/decision"),
        Some(&admin),
        json!({"decision": "Approve"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn approval_flow_toggles_maintenance_mode() {
    let (_dir, db) = test_db().await;
    db.assign_role("admin_500", Role::Admin).await.unwrap();
    db.assign_role("admin_501", Role::Admin).await.unwrap();
    let requester = admin_token("admin_500");
    let approver = admin_token("admin_501");

    let action = json!({
        "action": { "type": "MAINTENANCE_TOGGLE", "data": { "enabled": true, "message": "Annual stocktake" } }
    });
    let (status, body) = post(db.clone(), "/api/approvals", Some(&requester), action).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    let request_id = value["request_id"].as_str().unwrap().to_string();

    // Self-approval is refused
    let (status, _) = post(
        db.clone(),
        &format!("/api/approvals/{request_id}/decision"),
        Some(&requester),
        json!({"decision": "Approve"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post(
        db.clone(),
        &format!("/api/approvals/{request_id}/decision"),
        Some(&approver),
        json!({"decision": "Approve"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");

    let (status, body) = get(db, "/maintenance", None).await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["maintenance"], true);
    assert_eq!(value["message"], "Annual stocktake");
}
