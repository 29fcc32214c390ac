//! The public face of the payment engine.
//!
//! Each API struct wraps a storage backend (generic over the traits it needs) and holds the workflow logic for
//! one concern: order placement and settlement, refunds, approvals, analytics. The server crate instantiates
//! them over the SQLite backend and a live gateway client; tests swap in mocks.

mod analytics_api;
mod approval_api;
mod order_flow_api;
mod order_objects;
mod refund_api;

pub use analytics_api::AnalyticsApi;
pub use approval_api::{ApprovalApi, MAINTENANCE_MESSAGE_KEY, MAINTENANCE_MODE_KEY};
pub use order_flow_api::OrderFlowApi;
pub use order_objects::{CheckoutRequest, CheckoutResult};
pub use refund_api::RefundApi;
