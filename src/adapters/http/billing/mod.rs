//! HTTP adapter for the billing endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BillingAppState;
pub use routes::{billing_routes, health_routes, webhook_routes};
