//! Adapters layer - implementations of the ports.
//!
//! Each submodule binds one external technology to a port: PostgreSQL for
//! persistence, Resend for transactional email, Axum for the HTTP surface.

pub mod email;
pub mod http;
pub mod postgres;
