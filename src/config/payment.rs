//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Payment configuration (Stripe)
///
/// Credentials are optional outside production: without them the webhook
/// endpoint answers with a configuration error instead of the process
/// refusing to start.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: Option<String>,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: Option<String>,

    /// Stripe price ID for the Basic plan
    pub stripe_basic_price_id: Option<String>,

    /// Stripe price ID for the Pro plan
    pub stripe_pro_price_id: Option<String>,

    /// Stripe price ID for the Expert plan
    pub stripe_expert_price_id: Option<String>,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key
            .as_deref()
            .is_some_and(|k| k.starts_with("sk_test_"))
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key
            .as_deref()
            .is_some_and(|k| k.starts_with("sk_live_"))
    }

    /// Validate payment configuration
    ///
    /// Key formats are checked whenever a key is present. In production,
    /// the API key and webhook secret are required.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production {
            if self.stripe_api_key.is_none() {
                return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
            }
            if self.stripe_webhook_secret.is_none() {
                return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
            }
        }

        // Verify key prefixes for safety
        if let Some(key) = &self.stripe_api_key {
            if !key.starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
        }
        if let Some(secret) = &self.stripe_webhook_secret {
            if !secret.starts_with("whsec_") {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
        }

        Ok(())
    }
}
