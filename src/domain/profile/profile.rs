//! Profile entity.
//!
//! A Profile is the platform's record of one user's billing identity. It is
//! created the first time Stripe tells us about the user (checkout completion
//! or customer creation) and updated by every billing event after that.
//!
//! # Design Decisions
//!
//! - **Email is the natural key**: rows are upserted by email until a Stripe
//!   customer id is attached, which then becomes the primary join key
//! - **Never deleted by billing events**: cancellation is a status
//!   transition, not a row deletion
//! - **Absolute writes**: every billing event sets a concrete status, so
//!   replaying an event is harmless

use crate::domain::foundation::{ProfileId, Timestamp};
use serde::{Deserialize, Serialize};

use super::SubscriptionStatus;

/// A user's billing identity and subscription state.
///
/// # Invariants
///
/// - `email` is unique across profiles
/// - `stripe_customer_id` is unique once assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier for this profile.
    pub id: ProfileId,

    /// The user's email address.
    pub email: String,

    /// The user's display name, when known.
    pub full_name: Option<String>,

    /// Stripe customer ID, once the user has reached Stripe.
    pub stripe_customer_id: Option<String>,

    /// Current subscription status.
    pub subscription_status: SubscriptionStatus,

    /// When the profile was created.
    pub created_at: Timestamp,

    /// When the profile was last updated.
    pub updated_at: Timestamp,
}

impl Profile {
    /// Whether the profile currently grants access to recipe deliveries.
    pub fn has_access(&self) -> bool {
        self.subscription_status.has_access()
    }

    /// Display name with the platform's fallback for anonymous brewers.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Brewer")
    }
}

/// Fields written by an upsert-by-email operation.
///
/// `None` fields are left untouched on conflict; on insert they fall back to
/// column defaults (status defaults to `inactive`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpsert {
    /// Email the row is keyed by.
    pub email: String,

    /// Stripe customer id to attach, when the event carries one.
    pub stripe_customer_id: Option<String>,

    /// Display name to set.
    pub full_name: Option<String>,

    /// Status to set.
    pub subscription_status: Option<SubscriptionStatus>,
}

impl ProfileUpsert {
    /// Upsert for a completed checkout: attach the customer id and activate.
    pub fn checkout(email: impl Into<String>, stripe_customer_id: Option<String>) -> Self {
        Self {
            email: email.into(),
            stripe_customer_id,
            full_name: None,
            subscription_status: Some(SubscriptionStatus::Active),
        }
    }

    /// Upsert for a newly created Stripe customer: contact fields only.
    pub fn customer(
        email: impl Into<String>,
        stripe_customer_id: impl Into<String>,
        full_name: Option<String>,
    ) -> Self {
        Self {
            email: email.into(),
            stripe_customer_id: Some(stripe_customer_id.into()),
            full_name,
            subscription_status: None,
        }
    }
}

/// Patch applied by an update-by-customer-id operation.
///
/// Outer `None` leaves a field untouched. `full_name` is doubly optional:
/// `Some(None)` clears the name, mirroring a customer record whose name was
/// removed at the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New email address.
    pub email: Option<String>,

    /// New display name (`Some(None)` clears it).
    pub full_name: Option<Option<String>>,

    /// New subscription status.
    pub subscription_status: Option<SubscriptionStatus>,
}

impl ProfileUpdate {
    /// Patch that only changes the subscription status.
    pub fn status(status: SubscriptionStatus) -> Self {
        Self {
            subscription_status: Some(status),
            ..Default::default()
        }
    }

    /// Patch that syncs contact details from a provider customer record.
    pub fn contact(email: impl Into<String>, full_name: Option<String>) -> Self {
        Self {
            email: Some(email.into()),
            full_name: Some(full_name),
            subscription_status: None,
        }
    }

    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none() && self.subscription_status.is_none()
    }
}
