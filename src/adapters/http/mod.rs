//! HTTP adapters - Axum routes, handlers, and DTOs.

pub mod billing;
