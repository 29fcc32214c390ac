use actix_web::http::StatusCode;
use retail_payment_engine::db_types::Order;
use serde_json::json;

use crate::endpoint_tests::helpers::*;

#[actix_web::test]
async fn health_is_public() {
    let (_dir, db) = test_db().await;
    let (status, body) = get(db, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn maintenance_defaults_to_off() {
    let (_dir, db) = test_db().await;
    let (status, body) = get(db, "/maintenance", None).await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["maintenance"], false);
}

#[actix_web::test]
async fn checkout_requires_a_token() {
    let (_dir, db) = test_db().await;
    let (status, body) = post(db, "/api/orders", None, cod_checkout_body()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("error"));
}

#[actix_web::test]
async fn cod_checkout_lands_under_the_token_owner() {
    let (_dir, db) = test_db().await;
    let token = customer_token("cust_100");
    let (status, body) = post(db.clone(), "/api/orders", Some(&token), cod_checkout_body()).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    // The payload's customer_id is ignored; the token decides
    assert_eq!(value["order"]["customer_id"], "cust_100");
    assert_eq!(value["order"]["status"], "CodPending");
    assert!(value["gateway"].is_null());

    let (status, body) = get(db, "/api/my_orders", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].customer_id, "cust_100");
}

/// Another customer's order and a nonexistent order must be indistinguishable, so order ids cannot be
/// probed for existence.
#[actix_web::test]
async fn orders_are_hidden_from_other_customers() {
    let (_dir, db) = test_db().await;
    let owner = customer_token("cust_owner");
    let (_, body) = post(db.clone(), "/api/orders", Some(&owner), cod_checkout_body()).await;
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    let order_id = value["order"]["order_id"].as_str().unwrap().to_string();

    let snoop = customer_token("cust_snoop");
    let (existing, _) = get(db.clone(), &format!("/api/orders/{order_id}"), Some(&snoop)).await;
    let (absent, _) = get(db.clone(), "/api/orders/no-such-order", Some(&snoop)).await;
    assert_eq!(existing, StatusCode::NOT_FOUND);
    assert_eq!(absent, StatusCode::NOT_FOUND);

    // Same opacity on the refund request route
    let refund = serde_json::json!({ "reason": "arrived damaged" });
    let (status, _) =
        post(db.clone(), &format!("/api/orders/{order_id}/refund"), Some(&snoop), refund).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(db, &format!("/api/orders/{order_id}"), Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn forged_payment_callbacks_get_an_opaque_error() {
    let (_dir, db) = test_db().await;
    let payload = json!({
        "gateway_order_id": "order_DoesNotExist",
        "gateway_payment_id": "pay_0123456789",
        "signature": "deadbeef"
    });
    let (status, body) = post(db, "/payments/verify", None, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["error"], "Payment verification failed");
}
