use std::fmt::Debug;

use chrono::NaiveDate;
use rpg_common::Money;
use sqlx::SqlitePool;

use crate::{
    db::sqlite::{analytics, approvals, audit, auth, new_pool, orders, refunds, settings},
    db_types::{
        AdminActor,
        ApprovalRequest,
        ApprovalStatus,
        AuditLogEntry,
        DailyAggregate,
        NewApprovalRequest,
        NewOrder,
        NewRefundRecord,
        Order,
        OrderId,
        OrderStatusType,
        OrderUpdate,
        PaymentMethod,
        RefundRecord,
        Role,
    },
    traits::{
        AnalyticsStore,
        ApprovalManagement,
        AuditLog,
        AuthManagement,
        OrderManagement,
        PaymentEngineError,
        RefundLedger,
        SettingsManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, PaymentEngineError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::insert_order(order, &mut conn).await?)
    }

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_order_id(order_id, &mut conn).await?)
    }

    async fn fetch_order_by_gateway_id(&self, gateway_order_id: &str) -> Result<Option<Order>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_gateway_id(gateway_order_id, &mut conn).await?)
    }

    async fn update_order(&self, order_id: &OrderId, update: OrderUpdate) -> Result<Order, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::update_order(order_id, update, &mut conn).await?)
    }

    async fn update_order_financial(
        &self,
        order_id: &OrderId,
        expected_version: i64,
        update: OrderUpdate,
    ) -> Result<Order, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::update_order_financial(order_id, expected_version, update, &mut conn).await?)
    }

    async fn transition_status(
        &self,
        order_id: &OrderId,
        from: &[OrderStatusType],
        update: OrderUpdate,
    ) -> Result<Option<Order>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::transition_status(order_id, from, update, &mut conn).await?)
    }

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_all_orders(&mut conn).await?)
    }

    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_for_customer(customer_id, &mut conn).await?)
    }
}

impl RefundLedger for SqliteDatabase {
    async fn insert_refund_record(&self, record: NewRefundRecord) -> Result<RefundRecord, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(refunds::insert_refund_record(record, &mut conn).await?)
    }

    async fn fetch_refunds_for_order(&self, order_id: &OrderId) -> Result<Vec<RefundRecord>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(refunds::fetch_refunds_for_order(order_id, &mut conn).await?)
    }
}

impl ApprovalManagement for SqliteDatabase {
    async fn insert_approval_request(
        &self,
        request: NewApprovalRequest,
    ) -> Result<ApprovalRequest, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(approvals::insert_approval_request(request, &mut conn).await?)
    }

    async fn fetch_approval_request(&self, request_id: &str) -> Result<Option<ApprovalRequest>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(approvals::fetch_approval_request(request_id, &mut conn).await?)
    }

    async fn fetch_pending_approvals(&self) -> Result<Vec<ApprovalRequest>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(approvals::fetch_pending_approvals(&mut conn).await?)
    }

    async fn resolve_approval_request(
        &self,
        request_id: &str,
        status: ApprovalStatus,
        approver: &AdminActor,
        rejection_reason: Option<&str>,
    ) -> Result<Option<ApprovalRequest>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(approvals::resolve_approval_request(request_id, status, approver, rejection_reason, &mut conn).await?)
    }
}

impl AnalyticsStore for SqliteDatabase {
    async fn increment_daily(
        &self,
        date: NaiveDate,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<DailyAggregate, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(analytics::increment_daily(date, amount, method, &mut conn).await?)
    }

    async fn fetch_daily(&self, date: NaiveDate) -> Result<Option<DailyAggregate>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(analytics::fetch_daily(date, &mut conn).await?)
    }

    async fn fetch_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyAggregate>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(analytics::fetch_range(from, to, &mut conn).await?)
    }
}

impl AuditLog for SqliteDatabase {
    async fn append_audit(&self, admin_id: &str, action: &str, details: &str) -> Result<(), PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(audit::append_audit(admin_id, action, details, &mut conn).await?)
    }

    async fn fetch_recent_audit(&self, limit: i64) -> Result<Vec<AuditLogEntry>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(audit::fetch_recent_audit(limit, &mut conn).await?)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn fetch_roles_for_user(&self, user_id: &str) -> Result<Vec<Role>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(auth::fetch_roles_for_user(user_id, &mut conn).await?)
    }

    async fn assign_role(&self, user_id: &str, role: Role) -> Result<(), PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(auth::assign_role(user_id, role, &mut conn).await?)
    }
}

impl SettingsManagement for SqliteDatabase {
    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(settings::fetch_setting(key, &mut conn).await?)
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        Ok(settings::set_setting(key, value, &mut conn).await?)
    }
}
