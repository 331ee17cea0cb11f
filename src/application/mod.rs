//! Application layer - Commands and Handlers.
//!
//! Orchestrates domain operations and coordinates between ports.

pub mod handlers;
