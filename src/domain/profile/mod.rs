//! Profile domain - user billing identity.
//!
//! A profile tracks one user's email, Stripe customer link, and subscription
//! status. Billing webhook events are the only writers of subscription state.

mod profile;
mod subscription_status;

pub use profile::{Profile, ProfileUpdate, ProfileUpsert};
pub use subscription_status::SubscriptionStatus;
