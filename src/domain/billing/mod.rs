//! Billing domain - Stripe webhook envelope, verification, and plans.
//!
//! # Module Structure
//!
//! - `event` - Raw event envelope, typed payloads, and classified variants
//! - `verifier` - HMAC-SHA256 signature verification with replay protection
//! - `errors` - Webhook error taxonomy with HTTP status mapping
//! - `plan` - Static subscription plan catalog

mod errors;
mod event;
mod plan;
mod verifier;

pub use errors::WebhookError;
pub use event::{
    BillingEvent, CheckoutSessionPayload, CustomerPayload, InvoicePayload, StripeEvent,
    StripeEventData, SubscriptionPayload,
};
pub use plan::{PlanTier, SubscriptionPlan};
pub use verifier::{SignatureHeader, WebhookVerifier};

#[cfg(test)]
pub use event::StripeEventBuilder;
#[cfg(test)]
pub use verifier::compute_test_signature;
