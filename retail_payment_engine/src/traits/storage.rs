use chrono::NaiveDate;
use rpg_common::Money;

use crate::{
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
    traits::PaymentEngineError,
};

/// CRUD and indexed lookups over persisted orders. Orders are financial records: they are never deleted, and
/// the fields a transition may touch are restricted to [`OrderUpdate`].
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// Persists a brand-new order. Fails with `Conflict` if the order id is already taken.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentEngineError>;

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentEngineError>;

    /// At most one order may carry a given gateway id; if the data-integrity invariant is ever broken the
    /// earliest-created match is returned.
    async fn fetch_order_by_gateway_id(&self, gateway_order_id: &str) -> Result<Option<Order>, PaymentEngineError>;

    /// Merges the given fields into the order and stamps `updated_at`. Last-writer-wins; acceptable only for
    /// non-financial fields. Fails with `NotFound` if the order does not exist.
    async fn update_order(&self, order_id: &OrderId, update: OrderUpdate) -> Result<Order, PaymentEngineError>;

    /// Version-checked merge for financial transitions. The write only lands if the order's version still equals
    /// `expected_version`; otherwise another transition won the race and `Conflict` is returned.
    async fn update_order_financial(
        &self,
        order_id: &OrderId,
        expected_version: i64,
        update: OrderUpdate,
    ) -> Result<Order, PaymentEngineError>;

    /// Applies `update` only if the order's current status is one of `from`, in a single atomic statement.
    /// Returns `None` (without error) when the precondition did not hold, so callers can distinguish a lost race
    /// or duplicate delivery from a hard failure.
    async fn transition_status(
        &self,
        order_id: &OrderId,
        from: &[OrderStatusType],
        update: OrderUpdate,
    ) -> Result<Option<Order>, PaymentEngineError>;

    /// All orders, most recent first.
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, PaymentEngineError>;

    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, PaymentEngineError>;
}

/// Append-only refund ledger. One entry per refund decision outcome; entries are never mutated.
#[allow(async_fn_in_trait)]
pub trait RefundLedger: Clone {
    async fn insert_refund_record(&self, record: NewRefundRecord) -> Result<RefundRecord, PaymentEngineError>;

    async fn fetch_refunds_for_order(&self, order_id: &OrderId) -> Result<Vec<RefundRecord>, PaymentEngineError>;
}

/// Storage for the peer-review governance workflow.
#[allow(async_fn_in_trait)]
pub trait ApprovalManagement: Clone {
    async fn insert_approval_request(
        &self,
        request: NewApprovalRequest,
    ) -> Result<ApprovalRequest, PaymentEngineError>;

    async fn fetch_approval_request(&self, request_id: &str) -> Result<Option<ApprovalRequest>, PaymentEngineError>;

    /// All PENDING requests, most recent first.
    async fn fetch_pending_approvals(&self) -> Result<Vec<ApprovalRequest>, PaymentEngineError>;

    /// Resolves a request, conditioned on it still being PENDING (resolution is terminal). Returns `None` when
    /// the request was already resolved by someone else.
    async fn resolve_approval_request(
        &self,
        request_id: &str,
        status: ApprovalStatus,
        approver: &AdminActor,
        rejection_reason: Option<&str>,
    ) -> Result<Option<ApprovalRequest>, PaymentEngineError>;
}

/// Daily revenue/order counters. The increment must be atomic under concurrent order completions.
#[allow(async_fn_in_trait)]
pub trait AnalyticsStore: Clone {
    /// Adds one order worth `amount` to the aggregate for `date`, creating the record if it is the day's first.
    /// Single atomic read-modify-write; concurrent increments must all be counted.
    async fn increment_daily(
        &self,
        date: NaiveDate,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<DailyAggregate, PaymentEngineError>;

    async fn fetch_daily(&self, date: NaiveDate) -> Result<Option<DailyAggregate>, PaymentEngineError>;

    async fn fetch_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyAggregate>, PaymentEngineError>;
}

/// Append-only record of privileged mutations.
#[allow(async_fn_in_trait)]
pub trait AuditLog: Clone {
    async fn append_audit(&self, admin_id: &str, action: &str, details: &str) -> Result<(), PaymentEngineError>;

    /// The most recent `limit` entries, newest first.
    async fn fetch_recent_audit(&self, limit: i64) -> Result<Vec<AuditLogEntry>, PaymentEngineError>;
}

/// Live role records. Bearer-token role claims are only trusted after being cross-checked here.
#[allow(async_fn_in_trait)]
pub trait AuthManagement: Clone {
    async fn fetch_roles_for_user(&self, user_id: &str) -> Result<Vec<Role>, PaymentEngineError>;

    async fn assign_role(&self, user_id: &str, role: Role) -> Result<(), PaymentEngineError>;
}

/// Key-value store settings, mutated by approval executors (e.g. the maintenance toggle).
#[allow(async_fn_in_trait)]
pub trait SettingsManagement: Clone {
    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, PaymentEngineError>;

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), PaymentEngineError>;
}
