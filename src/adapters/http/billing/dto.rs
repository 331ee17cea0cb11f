//! Data transfer objects for the billing HTTP API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::PaymentConfig;
use crate::domain::billing::{PlanTier, SubscriptionPlan};

/// Standard error envelope returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "INVALID_SIGNATURE").
    pub error_code: String,

    /// Human-readable message.
    pub message: String,

    /// Optional field-level details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// Acknowledgment body for a handled webhook delivery.
///
/// Always `{"received": true}` on success; Stripe only inspects the status
/// code, the body exists for log correlation.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { received: true }
    }
}

/// One plan in the public catalog.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub tier: PlanTier,
    pub name: String,
    pub monthly_price_cents: u32,
    /// `None` means unlimited.
    pub recipes_per_month: Option<u32>,
    pub features: Vec<String>,
    /// Stripe price id, present when configured for this environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,
}

impl PlanResponse {
    /// Combines a catalog entry with the environment's price id.
    pub fn from_plan(plan: &SubscriptionPlan, payment: &PaymentConfig) -> Self {
        let price_id = match plan.tier {
            PlanTier::Basic => payment.stripe_basic_price_id.clone(),
            PlanTier::Pro => payment.stripe_pro_price_id.clone(),
            PlanTier::Expert => payment.stripe_expert_price_id.clone(),
        };

        Self {
            tier: plan.tier,
            name: plan.name.to_string(),
            monthly_price_cents: plan.monthly_price_cents,
            recipes_per_month: plan.recipes_per_month,
            features: plan.features.iter().map(|f| f.to_string()).collect(),
            price_id,
        }
    }
}

/// Response body for `GET /api/billing/plans`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlansResponse {
    pub plans: Vec<PlanResponse>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
