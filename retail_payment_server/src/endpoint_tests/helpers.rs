use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use gateway_tools::GatewayConfig;
use retail_payment_engine::{
    create_database_if_missing,
    db_types::Role,
    events::EventProducers,
    helpers::{TaxCalculator, DEFAULT_GST_RATE_BPS},
    run_migrations,
    AnalyticsApi,
    ApprovalApi,
    OrderFlowApi,
    RefundApi,
    SqliteDatabase,
};
use rpg_common::Secret;
use tempfile::TempDir;

use crate::{
    auth::{issue_token, JwtClaims, JwtDecoder},
    integrations::GatewayProvider,
    routes::{
        all_orders,
        analytics_range,
        assign_role,
        checkout,
        create_approval,
        daily_analytics,
        decide_approval,
        decide_refund,
        health,
        maintenance_status,
        my_orders,
        order_by_id,
        pending_approvals,
        recent_audit,
        request_refund,
        verify_payment,
    },
};

pub const JWT_SECRET: &str = "endpoint-test-jwt-secret";
pub const WEBHOOK_SECRET: &str = "endpoint-test-webhook-secret";

pub async fn test_db() -> (TempDir, SqliteDatabase) {
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let url = format!("sqlite://{}/server_test.db", dir.path().display());
    create_database_if_missing(&url).await.expect("Could not create database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Could not connect to database");
    run_migrations(db.pool()).await.expect("Error running DB migrations");
    (dir, db)
}

/// Registers the same app data and routes as the real server, minus the access logger, over the given database.
/// The gateway client points at the default config; tests only exercise paths that never reach it.
pub fn configure_app(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let provider = GatewayProvider::new(GatewayConfig::default()).expect("Could not build gateway client");
        let tax = TaxCalculator::new(DEFAULT_GST_RATE_BPS, "Maharashtra");
        let order_flow = OrderFlowApi::new(
            db.clone(),
            provider.clone(),
            tax,
            Secret::new(WEBHOOK_SECRET.to_string()),
            EventProducers::default(),
        );
        let refunds = RefundApi::new(db.clone(), provider, EventProducers::default());
        let approvals = ApprovalApi::new(db.clone());
        let analytics = AnalyticsApi::new(db.clone());
        let decoder = JwtDecoder::new(Secret::new(JWT_SECRET.to_string()));
        let api_scope = web::scope("/api")
            .service(checkout)
            .service(all_orders)
            .service(my_orders)
            .service(order_by_id)
            .service(request_refund)
            .service(decide_refund)
            .service(create_approval)
            .service(pending_approvals)
            .service(decide_approval)
            .service(daily_analytics)
            .service(analytics_range)
            .service(recent_audit)
            .service(assign_role);
        cfg.app_data(web::Data::new(order_flow))
            .app_data(web::Data::new(refunds))
            .app_data(web::Data::new(approvals))
            .app_data(web::Data::new(analytics))
            .app_data(web::Data::new(decoder))
            .app_data(web::Data::new(db))
            .service(health)
            .service(maintenance_status)
            .service(verify_payment)
            .service(api_scope);
    }
}

pub fn token_for(user_id: &str, name: &str, roles: Vec<Role>) -> String {
    let claims = JwtClaims {
        sub: user_id.to_string(),
        name: name.to_string(),
        roles,
        exp: (chrono::Utc::now().timestamp() + 3600) as u64,
    };
    issue_token(&claims, JWT_SECRET)
}

pub fn customer_token(user_id: &str) -> String {
    token_for(user_id, "Test Customer", vec![Role::Customer])
}

pub fn admin_token(user_id: &str) -> String {
    token_for(user_id, "Test Admin", vec![Role::Admin])
}

async fn send(db: SqliteDatabase, req: TestRequest) -> (StatusCode, String) {
    let app = App::new().configure(configure_app(db));
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let (_, res) = res.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub async fn get(db: SqliteDatabase, path: &str, token: Option<&str>) -> (StatusCode, String) {
    let mut req = TestRequest::get().uri(path);
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    send(db, req).await
}

pub async fn post(
    db: SqliteDatabase,
    path: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri(path).set_json(body);
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    send(db, req).await
}

pub fn cod_checkout_body() -> serde_json::Value {
    serde_json::json!({
        "customer_id": "ignored-by-the-server",
        "items": [
            { "name": "Round frame", "unit_price": 150_000, "quantity": 1 },
            { "name": "Blue-cut lenses", "unit_price": 80_000, "quantity": 1 }
        ],
        "total": 230_000,
        "buyer_state": "Kerala",
        "payment_method": "Cod",
        "currency": "INR"
    })
}
