//! Brewery Recipe Platform - Billing Backend
//!
//! This crate synchronizes Stripe billing events onto the platform's user
//! profiles and dispatches the transactional emails that accompany them.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
