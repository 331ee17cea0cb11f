//! Subscription status for user profiles.

use serde::{Deserialize, Serialize};

/// Subscription state of a profile, as synchronized from the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Subscription is paid up and grants full access.
    Active,

    /// No active subscription (default for new profiles, payment problems).
    Inactive,

    /// Subscription was cancelled by the user or the provider.
    Cancelled,

    /// Subscription is in its trial period.
    Trial,
}

impl SubscriptionStatus {
    /// Maps a provider subscription status string to the internal status.
    ///
    /// The mapping is total: statuses the platform does not model collapse
    /// to `Inactive` with a warning naming the raw value, so a new provider
    /// state degrades visibly instead of failing the webhook.
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trial,
            "canceled" | "cancelled" => SubscriptionStatus::Cancelled,
            "past_due" | "unpaid" | "incomplete" | "incomplete_expired" => {
                SubscriptionStatus::Inactive
            }
            other => {
                tracing::warn!(status = %other, "Unknown Stripe subscription status, defaulting to inactive");
                SubscriptionStatus::Inactive
            }
        }
    }

    /// Whether this status grants access to recipe deliveries.
    pub fn has_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trial)
    }

    /// Database/API string form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Trial => "trial",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn maps_active_to_active() {
        assert_eq!(
            SubscriptionStatus::from_provider("active"),
            SubscriptionStatus::Active
        );
    }

    #[test]
    fn maps_trialing_to_trial() {
        assert_eq!(
            SubscriptionStatus::from_provider("trialing"),
            SubscriptionStatus::Trial
        );
    }

    #[test]
    fn maps_both_cancellation_spellings() {
        assert_eq!(
            SubscriptionStatus::from_provider("canceled"),
            SubscriptionStatus::Cancelled
        );
        assert_eq!(
            SubscriptionStatus::from_provider("cancelled"),
            SubscriptionStatus::Cancelled
        );
    }

    #[test]
    fn maps_payment_problem_states_to_inactive() {
        for raw in ["past_due", "unpaid", "incomplete", "incomplete_expired"] {
            assert_eq!(
                SubscriptionStatus::from_provider(raw),
                SubscriptionStatus::Inactive,
                "{raw} should map to inactive"
            );
        }
    }

    #[test]
    fn unknown_status_defaults_to_inactive() {
        assert_eq!(
            SubscriptionStatus::from_provider("paused"),
            SubscriptionStatus::Inactive
        );
        assert_eq!(
            SubscriptionStatus::from_provider(""),
            SubscriptionStatus::Inactive
        );
    }

    #[test]
    fn access_check() {
        assert!(SubscriptionStatus::Active.has_access());
        assert!(SubscriptionStatus::Trial.has_access());
        assert!(!SubscriptionStatus::Inactive.has_access());
        assert!(!SubscriptionStatus::Cancelled.has_access());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&SubscriptionStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");

        let status: SubscriptionStatus = serde_json::from_str("\"trial\"").unwrap();
        assert_eq!(status, SubscriptionStatus::Trial);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(SubscriptionStatus::Cancelled.to_string(), "cancelled");
    }

    // ========================================================================
    // Property tests using proptest
    // ========================================================================

    proptest! {
        #[test]
        fn mapping_is_total(raw in "\\PC*") {
            // Every input maps to exactly one of the four statuses.
            let status = SubscriptionStatus::from_provider(&raw);
            prop_assert!(matches!(
                status,
                SubscriptionStatus::Active
                    | SubscriptionStatus::Inactive
                    | SubscriptionStatus::Cancelled
                    | SubscriptionStatus::Trial
            ));
        }

        #[test]
        fn mapping_is_deterministic(raw in "\\PC*") {
            prop_assert_eq!(
                SubscriptionStatus::from_provider(&raw),
                SubscriptionStatus::from_provider(&raw)
            );
        }

        #[test]
        fn unrecognized_inputs_map_to_inactive(raw in "[a-z_]{1,20}") {
            prop_assume!(!matches!(
                raw.as_str(),
                "active" | "trialing" | "canceled" | "cancelled"
                    | "past_due" | "unpaid" | "incomplete" | "incomplete_expired"
            ));
            prop_assert_eq!(
                SubscriptionStatus::from_provider(&raw),
                SubscriptionStatus::Inactive
            );
        }
    }
}
