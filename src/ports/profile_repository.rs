//! ProfileRepository port - the profile store the webhook flow synchronizes.
//!
//! # Design
//!
//! - **Two-key identity**: creation-style events resolve by email (and may
//!   attach a Stripe customer id); every other event resolves by customer id
//! - **Exclusive writer**: the webhook synchronizer is the only component
//!   that mutates subscription status
//! - **Idempotent operations**: upserts and absolute patches, never
//!   increments, so redelivered events are harmless

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::profile::{Profile, ProfileUpdate, ProfileUpsert};

/// Repository port for profile persistence.
///
/// Implementations must enforce uniqueness on `email` and on
/// `stripe_customer_id` once assigned; concurrent upserts of the same
/// identity must not create duplicate rows.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a profile by its Stripe customer id.
    ///
    /// Returns `None` if no profile is linked to that customer.
    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<Profile>, DomainError>;

    /// Find a profile by email.
    ///
    /// Returns `None` if no profile exists for that email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError>;

    /// Insert or update a profile keyed by email.
    ///
    /// On conflict, `None` fields of the upsert leave existing columns
    /// untouched. Returns the resulting row.
    ///
    /// # Errors
    ///
    /// - `DuplicateCustomerId` if the upsert would attach a customer id
    ///   already linked to a different profile
    /// - `DatabaseError` on persistence failure
    async fn upsert_by_email(&self, record: ProfileUpsert) -> Result<Profile, DomainError>;

    /// Apply a patch to the profile linked to a Stripe customer id.
    ///
    /// Returns `None` when no profile is linked to that customer - the
    /// caller decides whether that is an error or a tolerated no-op.
    ///
    /// # Errors
    ///
    /// - `DuplicateEmail` if the patch would take an email already in use
    /// - `DatabaseError` on persistence failure
    async fn update_by_stripe_customer_id(
        &self,
        customer_id: &str,
        patch: ProfileUpdate,
    ) -> Result<Option<Profile>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ProfileRepository) {}
    }
}
