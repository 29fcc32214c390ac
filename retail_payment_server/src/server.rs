use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use log::*;
use retail_payment_engine::{
    create_database_if_missing,
    events::{EventHandlers, EventHooks, EventProducers},
    helpers::TaxCalculator,
    run_migrations,
    AnalyticsApi,
    ApprovalApi,
    OrderFlowApi,
    RefundApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
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
use crate::auth::JwtDecoder;

const EVENT_BUFFER_SIZE: usize = 100;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    create_database_if_missing(&config.database_url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    run_migrations(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, notification_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let provider = GatewayProvider::new(config.gateway.clone())?;
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let tax = TaxCalculator::new(config.gst_rate_bps, &config.seller_state);
        let order_flow = OrderFlowApi::new(
            db.clone(),
            provider.clone(),
            tax,
            config.webhook_secret.clone(),
            producers.clone(),
        );
        let refunds = RefundApi::new(db.clone(), provider.clone(), producers.clone());
        let approvals = ApprovalApi::new(db.clone());
        let analytics = AnalyticsApi::new(db.clone());
        let decoder = JwtDecoder::new(config.jwt_secret.clone());
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
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rps::access_log"))
            .app_data(web::Data::new(order_flow))
            .app_data(web::Data::new(refunds))
            .app_data(web::Data::new(approvals))
            .app_data(web::Data::new(analytics))
            .app_data(web::Data::new(decoder))
            .app_data(web::Data::new(db.clone()))
            .service(health)
            .service(maintenance_status)
            .service(verify_payment)
            .service(api_scope)
    })
    .bind((host, port))?
    .run();
    Ok(srv)
}

/// Side effects that run off the financial path. The document/notification service is not part of this
/// deployment, so the hooks log what a subscriber would act on.
pub fn notification_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_placed(|ev| {
        Box::pin(async move {
            info!(
                "📧️ Order confirmation for {} queued for {} ({})",
                ev.order.order_id,
                ev.order.customer_id,
                ev.order.invoice_number.as_deref().unwrap_or("no invoice")
            );
        })
    });
    hooks.on_payment_verified(|ev| {
        Box::pin(async move {
            info!("📧️ Payment receipt for {} queued: {} received", ev.order.order_id, ev.order.total_price);
        })
    });
    hooks.on_refund_settled(|ev| {
        Box::pin(async move {
            info!(
                "📧️ Refund notice for {} queued: {} ({})",
                ev.order.order_id, ev.record.amount, ev.record.refund_id
            );
        })
    });
    hooks
}
