//! Behaviour contracts for storage backends and the external payment provider.
//!
//! The engine's public API is generic over these traits. The SQLite backend in [`crate::db`] implements the
//! storage traits; `gateway_tools` (wrapped by the server) implements [`PaymentProvider`]; tests substitute mocks.

mod errors;
mod payment_provider;
mod storage;

pub use errors::PaymentEngineError;
pub use payment_provider::{GatewayIntent, GatewayRefund, PaymentProvider};
pub use storage::{
    AnalyticsStore,
    ApprovalManagement,
    AuditLog,
    AuthManagement,
    OrderManagement,
    RefundLedger,
    SettingsManagement,
};
