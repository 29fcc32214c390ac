//! Retail Payment Engine
//!
//! Core logic for the order lifecycle, payment verification and refund governance of the store. The library is
//! provider-agnostic: the payment gateway and the storage backend are both traits, and the engine only knows
//! about their contracts.
//!
//! The library is divided into three main sections:
//! 1. Database management ([`mod@db`]). SQLite is the supported backend. You should never need to access the
//!    database directly; use the public API instead. The exception is the data types stored in the database,
//!    which are defined in [`db_types`] and are public.
//! 2. The engine public API ([`mod@rpe_api`]). Checkout and payment settlement ([`OrderFlowApi`]), the refund
//!    workflow ([`RefundApi`]), peer-review approvals ([`ApprovalApi`]) and daily analytics ([`AnalyticsApi`]).
//!    Backends implement the traits in [`mod@traits`] to plug in underneath.
//! 3. Events ([`mod@events`]). Side effects like customer notifications subscribe to engine events
//!    (order placed, payment verified, refund settled) and run on their own tasks, off the financial path.

mod db;

pub mod db_types;
pub mod events;
pub mod helpers;
mod rpe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{create_database_if_missing, db_url, run_migrations, SqliteDatabase};
pub use rpe_api::{
    AnalyticsApi,
    ApprovalApi,
    CheckoutRequest,
    CheckoutResult,
    OrderFlowApi,
    RefundApi,
    MAINTENANCE_MESSAGE_KEY,
    MAINTENANCE_MODE_KEY,
};
pub use traits::PaymentEngineError;
