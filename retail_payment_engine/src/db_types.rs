use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use log::error;
use rpg_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    PaymentMethod      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Settled through the payment gateway at checkout.
    Online,
    /// Cash on delivery. Collected physically; the gateway is never involved.
    Cod,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Online => write!(f, "Online"),
            PaymentMethod::Cod => write!(f, "Cod"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Online" => Ok(Self::Online),
            "Cod" => Ok(Self::Cod),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// Online order created; gateway intent issued, settlement callback not seen yet.
    Pending,
    /// COD order placed; payment will be collected at delivery.
    CodPending,
    /// Payment verified. The order is being prepared.
    Processing,
    /// Settled and fulfilled.
    Paid,
    /// Payment verification failed for the last attempt. The customer may retry with a new intent.
    Failed,
    /// The refund workflow returned the money.
    Refunded,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatusType {
    /// An order must have reached at least `Processing` before a refund makes sense; `Pending` and `Failed` orders
    /// were never paid for.
    pub fn is_refundable(&self) -> bool {
        !matches!(self, OrderStatusType::Pending | OrderStatusType::Failed)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::Pending => "Pending",
            OrderStatusType::CodPending => "CodPending",
            OrderStatusType::Processing => "Processing",
            OrderStatusType::Paid => "Paid",
            OrderStatusType::Failed => "Failed",
            OrderStatusType::Refunded => "Refunded",
            OrderStatusType::Shipped => "Shipped",
            OrderStatusType::Delivered => "Delivered",
            OrderStatusType::Cancelled => "Cancelled",
        };
        write!(f, "{s}")
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "CodPending" => Ok(Self::CodPending),
            "Processing" => Ok(Self::Processing),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            "Refunded" => Ok(Self::Refunded),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------   RefundStatusType    -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum RefundStatusType {
    None,
    Requested,
    Approved,
    Rejected,
    Refunded,
    Failed,
}

impl RefundStatusType {
    /// A refund can be requested unless one is already in flight or complete. Rejected and failed refunds may be
    /// re-requested.
    pub fn allows_new_request(&self) -> bool {
        !matches!(self, RefundStatusType::Requested | RefundStatusType::Refunded)
    }
}

impl Display for RefundStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RefundStatusType::None => "None",
            RefundStatusType::Requested => "Requested",
            RefundStatusType::Approved => "Approved",
            RefundStatusType::Rejected => "Rejected",
            RefundStatusType::Refunded => "Refunded",
            RefundStatusType::Failed => "Failed",
        };
        write!(f, "{s}")
    }
}

impl From<String> for RefundStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid refund status: {value}. But this conversion cannot fail. Defaulting to None");
            RefundStatusType::None
        })
    }
}

impl FromStr for RefundStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Requested" => Ok(Self::Requested),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            "Refunded" => Ok(Self::Refunded),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid refund status: {s}"))),
        }
    }
}

//--------------------------------------      LineItem         -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    /// Optional add-on (e.g. prescription lenses) priced on top of the unit price.
    #[serde(default)]
    pub addon_price: Option<Money>,
}

impl LineItem {
    pub fn line_total(&self) -> Money {
        let per_unit = self.unit_price + self.addon_price.unwrap_or_default();
        per_unit * i64::from(self.quantity)
    }
}

//--------------------------------------    TaxBreakdown       -------------------------------------------------------
/// GST split for a tax-inclusive total. Either `igst` is set (inter-state sale) or `cgst`/`sgst` are (intra-state),
/// never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub taxable: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    /// GST rate in basis points (1800 = 18%)
    pub rate_bps: i64,
    pub inter_state: bool,
}

impl TaxBreakdown {
    pub fn gst(&self) -> Money {
        self.cgst + self.sgst + self.igst
    }

    pub fn total(&self) -> Money {
        self.taxable + self.gst()
    }
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub invoice_number: Option<String>,
    /// Identifier assigned by the payment gateway when the intent was created. Online orders only.
    pub gateway_order_id: Option<String>,
    /// Gateway payment reference. Set exactly once, by a successful settlement verification.
    pub payment_id: Option<String>,
    pub customer_id: String,
    pub items: Json<Vec<LineItem>>,
    pub total_price: Money,
    pub taxable_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    pub tax_rate_bps: i64,
    pub inter_state: bool,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    pub refund_status: RefundStatusType,
    pub refund_reason: Option<String>,
    pub refund_date: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    /// Optimistic-concurrency token. Every financial write is conditioned on this value and increments it, so two
    /// transitions racing on the same order cannot both win.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn tax_breakdown(&self) -> TaxBreakdown {
        TaxBreakdown {
            taxable: self.taxable_amount,
            cgst: self.cgst,
            sgst: self.sgst,
            igst: self.igst,
            rate_bps: self.tax_rate_bps,
            inter_state: self.inter_state,
        }
    }
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub invoice_number: Option<String>,
    pub gateway_order_id: Option<String>,
    pub customer_id: String,
    pub items: Vec<LineItem>,
    pub total_price: Money,
    pub tax: TaxBreakdown,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
}

//--------------------------------------      OrderUpdate      -------------------------------------------------------
/// The set of fields a financial transition is allowed to touch. Everything else on an order is immutable once
/// created. An empty update is a no-op.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub status: Option<OrderStatusType>,
    pub refund_status: Option<RefundStatusType>,
    pub refund_reason: Option<String>,
    pub refund_date: Option<DateTime<Utc>>,
    pub payment_id: Option<String>,
    pub failure_reason: Option<String>,
}

impl OrderUpdate {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_refund_status(mut self, status: RefundStatusType) -> Self {
        self.refund_status = Some(status);
        self
    }

    pub fn with_refund_reason<S: Into<String>>(mut self, reason: S) -> Self {
        self.refund_reason = Some(reason.into());
        self
    }

    pub fn with_refund_date(mut self, date: DateTime<Utc>) -> Self {
        self.refund_date = Some(date);
        self
    }

    pub fn with_payment_id<S: Into<String>>(mut self, payment_id: S) -> Self {
        self.payment_id = Some(payment_id.into());
        self
    }

    pub fn with_failure_reason<S: Into<String>>(mut self, reason: S) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() &&
            self.refund_status.is_none() &&
            self.refund_reason.is_none() &&
            self.refund_date.is_none() &&
            self.payment_id.is_none() &&
            self.failure_reason.is_none()
    }
}

//--------------------------------------      RefundType       -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum RefundType {
    /// COD money is returned out-of-band; the ledger entry is bookkeeping only.
    CodManual,
    /// Refund executed against the gateway.
    OnlineAuto,
}

impl Display for RefundType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefundType::CodManual => write!(f, "CodManual"),
            RefundType::OnlineAuto => write!(f, "OnlineAuto"),
        }
    }
}

impl FromStr for RefundType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CodManual" => Ok(Self::CodManual),
            "OnlineAuto" => Ok(Self::OnlineAuto),
            s => Err(ConversionError(format!("Invalid refund type: {s}"))),
        }
    }
}

//--------------------------------------     RefundRecord      -------------------------------------------------------
/// Immutable ledger entry, written exactly once per refund decision outcome. Never updated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RefundRecord {
    pub id: i64,
    pub refund_id: String,
    pub order_id: OrderId,
    pub payment_id: Option<String>,
    pub amount: Money,
    pub status: RefundStatusType,
    pub refund_type: RefundType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRefundRecord {
    pub refund_id: String,
    pub order_id: OrderId,
    pub payment_id: Option<String>,
    pub amount: Money,
    pub status: RefundStatusType,
    pub refund_type: RefundType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundDecision {
    Approve,
    Reject,
}

//--------------------------------------    ApprovalAction     -------------------------------------------------------
/// The payload of an approval request, tagged by action type. Each variant owns its typed payload; the executor
/// registered for the variant's tag interprets it when the request is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ApprovalAction {
    #[serde(rename = "MAINTENANCE_TOGGLE")]
    MaintenanceToggle(MaintenanceToggle),
}

impl ApprovalAction {
    pub fn action_type(&self) -> &'static str {
        match self {
            ApprovalAction::MaintenanceToggle(_) => "MAINTENANCE_TOGGLE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceToggle {
    pub enabled: bool,
    #[serde(default)]
    pub message: Option<String>,
}

//--------------------------------------    ApprovalStatus     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "Pending"),
            ApprovalStatus::Approved => write!(f, "Approved"),
            ApprovalStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            s => Err(ConversionError(format!("Invalid approval status: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

//--------------------------------------     AdminActor        -------------------------------------------------------
/// The verified identity of a privileged actor, as handed to us by the identity verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminActor {
    pub id: String,
    pub name: String,
}

impl AdminActor {
    pub fn new<S1: Into<String>, S2: Into<String>>(id: S1, name: S2) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

//--------------------------------------   ApprovalRequest     -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: i64,
    pub request_id: String,
    pub action_type: String,
    #[sqlx(rename = "action_data")]
    pub action: Json<ApprovalAction>,
    pub requester_id: String,
    pub requester_name: String,
    pub status: ApprovalStatus,
    pub approver_id: Option<String>,
    pub approver_name: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewApprovalRequest {
    pub request_id: String,
    pub action: ApprovalAction,
    pub requester: AdminActor,
}

//--------------------------------------   DailyAggregate      -------------------------------------------------------
/// Per-calendar-day running totals. Only ever mutated through the atomic upsert in the analytics store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_revenue: Money,
    pub total_orders: i64,
    pub cod_orders: i64,
    pub online_payments: i64,
}

//--------------------------------------    AuditLogEntry      -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub admin_id: String,
    pub action: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        Role           -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "Customer"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(Self::Customer),
            "Admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}
