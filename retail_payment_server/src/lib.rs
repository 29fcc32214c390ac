//! # Retail payment server
//!
//! REST front for the retail payment engine. It is responsible for:
//! * serving the storefront checkout and order-history endpoints,
//! * receiving settlement callbacks from the payment gateway,
//! * the admin surface: refund decisions, peer-review approvals, analytics, the audit trail.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Authentication
//! Bearer tokens (HS256 JWTs) issued by the store's identity service. This server only verifies them; admin
//! role claims are additionally cross-checked against the live `roles` table on every privileged call.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
