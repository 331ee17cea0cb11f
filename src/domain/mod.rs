//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `billing` - Stripe event envelope, signature verification, plan catalog
//! - `profile` - User billing identity and subscription status

pub mod billing;
pub mod foundation;
pub mod profile;
