//! REST client for the external payment gateway.
//!
//! The gateway handles card/UPI/netbanking settlement and refunds. This crate only knows how to talk to its REST
//! API; the decision of *when* to create an intent or execute a refund lives in `retail_payment_engine`.

mod api;
mod config;
mod data_objects;
mod error;

pub use api::GatewayApi;
pub use config::GatewayConfig;
pub use data_objects::{PaymentIntent, RefundNotes, RefundRequestBody, RefundResponse};
pub use error::GatewayApiError;
