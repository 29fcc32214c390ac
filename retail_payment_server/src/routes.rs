//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate
//! module. Keep this module neat and tidy 🙏
//!
//! Handlers are deliberately thin: deserialize, authorize, delegate to the engine API, map the result. All
//! workflow rules (state machines, version checks, audit writes) live in `retail_payment_engine`, so nothing
//! here should ever inspect an order's status.

use std::str::FromStr;

use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::NaiveDate;
use log::*;
use retail_payment_engine::{
    db_types::{AdminActor, OrderId, Role},
    traits::{AnalyticsStore, AuditLog, AuthManagement, OrderManagement, SettingsManagement},
    AnalyticsApi,
    ApprovalApi,
    CheckoutRequest,
    OrderFlowApi,
    RefundApi,
    SqliteDatabase,
    MAINTENANCE_MESSAGE_KEY,
    MAINTENANCE_MODE_KEY,
};

use crate::{
    auth::{require_role, JwtClaims},
    data_objects::{
        ApprovalDecisionParams,
        ApprovalRequestParams,
        JsonResponse,
        LimitQuery,
        MaintenanceStatus,
        PaymentCallbackPayload,
        RangeQuery,
        RefundDecisionParams,
        RefundRequestParams,
        RoleAssignmentParams,
    },
    errors::ServerError,
    integrations::GatewayProvider,
};

pub type OrderFlow = OrderFlowApi<SqliteDatabase, GatewayProvider>;
pub type Refunds = RefundApi<SqliteDatabase, GatewayProvider>;
pub type Approvals = ApprovalApi<SqliteDatabase>;
pub type Analytics = AnalyticsApi<SqliteDatabase>;

impl JwtClaims {
    fn actor(&self) -> AdminActor {
        AdminActor::new(self.sub.clone(), self.name.clone())
    }
}

// ----------------------------------------   Public routes   ---------------------------------------------------

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Maintenance banner for the storefront. Public by design; it is what tells customers the shop is closed.
#[get("/maintenance")]
pub async fn maintenance_status(db: web::Data<SqliteDatabase>) -> Result<HttpResponse, ServerError> {
    let maintenance = flag_enabled(db.fetch_setting(MAINTENANCE_MODE_KEY).await?);
    let message = if maintenance { db.fetch_setting(MAINTENANCE_MESSAGE_KEY).await? } else { None };
    Ok(HttpResponse::Ok().json(MaintenanceStatus { maintenance, message }))
}

/// The settlement callback posted by the payment gateway. Authenticated by its HMAC signature rather than a
/// bearer token; the response is deliberately uninformative on failure.
#[post("/payments/verify")]
pub async fn verify_payment(
    api: web::Data<OrderFlow>,
    body: web::Json<PaymentCallbackPayload>,
) -> Result<HttpResponse, ServerError> {
    let payload = body.into_inner();
    let order =
        api.verify_payment(&payload.gateway_order_id, &payload.gateway_payment_id, &payload.signature).await?;
    Ok(HttpResponse::Ok().json(order))
}

// ----------------------------------------   Order routes   ----------------------------------------------------

#[post("/orders")]
pub async fn checkout(
    claims: JwtClaims,
    api: web::Data<OrderFlow>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, ServerError> {
    let mut req = body.into_inner();
    // The customer on the order is whoever the token says, not whatever the payload claims
    req.customer_id = claims.sub.clone();
    let result = api.checkout(req).await?;
    Ok(HttpResponse::Created().json(result))
}

#[get("/orders")]
pub async fn all_orders(
    claims: JwtClaims,
    api: web::Data<OrderFlow>,
    db: web::Data<SqliteDatabase>,
) -> Result<HttpResponse, ServerError> {
    require_role(&claims, Role::Admin, db.get_ref()).await?;
    let orders = api.fetch_all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

#[get("/my_orders")]
pub async fn my_orders(claims: JwtClaims, api: web::Data<OrderFlow>) -> Result<HttpResponse, ServerError> {
    let orders = api.fetch_orders_for_customer(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

#[get("/orders/{order_id}")]
pub async fn order_by_id(
    claims: JwtClaims,
    api: web::Data<OrderFlow>,
    db: web::Data<SqliteDatabase>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    let order = api.fetch_order(&order_id).await?.ok_or_else(|| not_found(&order_id))?;
    // Another customer's order looks exactly like a missing one, so ids cannot be probed for existence
    if order.customer_id != claims.sub && require_role(&claims, Role::Admin, db.get_ref()).await.is_err() {
        return Err(not_found(&order_id));
    }
    Ok(HttpResponse::Ok().json(order))
}

// ----------------------------------------   Refund routes   ---------------------------------------------------

#[post("/orders/{order_id}/refund")]
pub async fn request_refund(
    claims: JwtClaims,
    api: web::Data<Refunds>,
    db: web::Data<SqliteDatabase>,
    path: web::Path<String>,
    body: web::Json<RefundRequestParams>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    let owner = db.fetch_order_by_id(&order_id).await?.ok_or_else(|| not_found(&order_id))?.customer_id;
    if owner != claims.sub && require_role(&claims, Role::Admin, db.get_ref()).await.is_err() {
        return Err(not_found(&order_id));
    }
    let order = api.request_refund(&order_id, &body.reason).await?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/orders/{order_id}/refund/decision")]
pub async fn decide_refund(
    claims: JwtClaims,
    api: web::Data<Refunds>,
    db: web::Data<SqliteDatabase>,
    path: web::Path<String>,
    body: web::Json<RefundDecisionParams>,
) -> Result<HttpResponse, ServerError> {
    require_role(&claims, Role::Admin, db.get_ref()).await?;
    let order_id = OrderId(path.into_inner());
    let params = body.into_inner();
    let order = api.decide_refund(&order_id, params.decision, &claims.actor(), params.note.as_deref()).await?;
    Ok(HttpResponse::Ok().json(order))
}

// ----------------------------------------   Approval routes   -------------------------------------------------

#[post("/approvals")]
pub async fn create_approval(
    claims: JwtClaims,
    api: web::Data<Approvals>,
    db: web::Data<SqliteDatabase>,
    body: web::Json<ApprovalRequestParams>,
) -> Result<HttpResponse, ServerError> {
    require_role(&claims, Role::Admin, db.get_ref()).await?;
    let request = api.create_request(body.into_inner().action, claims.actor()).await?;
    Ok(HttpResponse::Created().json(request))
}

#[get("/approvals/pending")]
pub async fn pending_approvals(
    claims: JwtClaims,
    api: web::Data<Approvals>,
    db: web::Data<SqliteDatabase>,
) -> Result<HttpResponse, ServerError> {
    require_role(&claims, Role::Admin, db.get_ref()).await?;
    let pending = api.list_pending().await?;
    Ok(HttpResponse::Ok().json(pending))
}

#[post("/approvals/{request_id}/decision")]
pub async fn decide_approval(
    claims: JwtClaims,
    api: web::Data<Approvals>,
    db: web::Data<SqliteDatabase>,
    path: web::Path<String>,
    body: web::Json<ApprovalDecisionParams>,
) -> Result<HttpResponse, ServerError> {
    require_role(&claims, Role::Admin, db.get_ref()).await?;
    let params = body.into_inner();
    let request =
        api.decide(&path.into_inner(), params.decision, &claims.actor(), params.reason.as_deref()).await?;
    Ok(HttpResponse::Ok().json(request))
}

// ----------------------------------------   Admin routes   ----------------------------------------------------

#[get("/analytics/daily/{date}")]
pub async fn daily_analytics(
    claims: JwtClaims,
    api: web::Data<Analytics>,
    db: web::Data<SqliteDatabase>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServerError> {
    require_role(&claims, Role::Admin, db.get_ref()).await?;
    let date = NaiveDate::from_str(&path.into_inner())
        .map_err(|e| ServerError::InvalidRequestBody(format!("Invalid date: {e}")))?;
    match api.daily_summary(date).await? {
        Some(aggregate) => Ok(HttpResponse::Ok().json(aggregate)),
        None => Err(ServerError::EngineError(retail_payment_engine::PaymentEngineError::NotFound(format!(
            "No sales recorded on {date}"
        )))),
    }
}

#[get("/analytics")]
pub async fn analytics_range(
    claims: JwtClaims,
    api: web::Data<Analytics>,
    db: web::Data<SqliteDatabase>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, ServerError> {
    require_role(&claims, Role::Admin, db.get_ref()).await?;
    let aggregates = api.summary_range(query.from, query.to).await?;
    Ok(HttpResponse::Ok().json(aggregates))
}

#[get("/audit")]
pub async fn recent_audit(
    claims: JwtClaims,
    db: web::Data<SqliteDatabase>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, ServerError> {
    require_role(&claims, Role::Admin, db.get_ref()).await?;
    let entries = db.fetch_recent_audit(query.limit.clamp(1, 500)).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[post("/roles")]
pub async fn assign_role(
    claims: JwtClaims,
    db: web::Data<SqliteDatabase>,
    body: web::Json<RoleAssignmentParams>,
) -> Result<HttpResponse, ServerError> {
    require_role(&claims, Role::Admin, db.get_ref()).await?;
    let params = body.into_inner();
    db.assign_role(&params.user_id, params.role).await?;
    db.append_audit(&claims.sub, "ROLE_ASSIGNED", &format!("{} -> {}", params.user_id, params.role)).await?;
    info!("💻️ {} assigned the {} role to {}", claims.sub, params.role, params.user_id);
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("{} role assigned", params.role))))
}

fn not_found(order_id: &OrderId) -> ServerError {
    ServerError::EngineError(retail_payment_engine::PaymentEngineError::NotFound(order_id.to_string()))
}

/// Settings are stored as strings. A flag counts as set only for an explicit "true" or "1".
fn flag_enabled(value: Option<String>) -> bool {
    matches!(value.as_deref().map(str::trim), Some("true" | "1"))
}

#[cfg(test)]
mod test {
    use super::flag_enabled;

    #[test]
    fn flag_parsing() {
        assert!(flag_enabled(Some("true".to_string())));
        assert!(flag_enabled(Some(" 1 ".to_string())));
        assert!(!flag_enabled(Some("false".to_string())));
        assert!(!flag_enabled(Some("maybe".to_string())));
        assert!(!flag_enabled(None));
    }
}
