//! Subscription plan catalog.
//!
//! The platform sells three plans. The catalog is static; only the Stripe
//! price ids vary by environment and are attached from configuration at the
//! API boundary.

use serde::{Deserialize, Serialize};

/// Subscription plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Entry plan: a few recipes a month.
    Basic,
    /// Mid plan: more recipes plus equipment tips.
    Pro,
    /// Top plan: unlimited recipes and consultation.
    Expert,
}

impl PlanTier {
    /// Display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Basic => "Basic Plan",
            PlanTier::Pro => "Pro Plan",
            PlanTier::Expert => "Expert Plan",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One entry of the plan catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionPlan {
    /// Plan tier.
    pub tier: PlanTier,

    /// Display name.
    pub name: &'static str,

    /// Monthly price in cents (USD).
    pub monthly_price_cents: u32,

    /// Personalized recipes per month; `None` means unlimited.
    pub recipes_per_month: Option<u32>,

    /// Marketing feature list.
    pub features: &'static [&'static str],
}

impl SubscriptionPlan {
    /// The full catalog, cheapest first.
    pub fn catalog() -> &'static [SubscriptionPlan] {
        &[
            SubscriptionPlan {
                tier: PlanTier::Basic,
                name: "Basic Plan",
                monthly_price_cents: 1900,
                recipes_per_month: Some(3),
                features: &[
                    "3 personalized recipes per month",
                    "PDF + BeerXML downloads",
                    "Basic support",
                ],
            },
            SubscriptionPlan {
                tier: PlanTier::Pro,
                name: "Pro Plan",
                monthly_price_cents: 3900,
                recipes_per_month: Some(5),
                features: &[
                    "5 personalized recipes per month",
                    "PDF + BeerXML downloads",
                    "Equipment optimization tips",
                    "Priority support",
                ],
            },
            SubscriptionPlan {
                tier: PlanTier::Expert,
                name: "Expert Plan",
                monthly_price_cents: 7900,
                recipes_per_month: None,
                features: &[
                    "Unlimited recipe access",
                    "Custom recipe generation",
                    "1-on-1 brewing consultation",
                    "Advanced analytics",
                ],
            },
        ]
    }
}
