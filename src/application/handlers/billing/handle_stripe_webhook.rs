//! HandleStripeWebhookHandler - command handler for inbound Stripe webhooks.
//!
//! The full flow: verify signature → idempotency ledger check → classify →
//! per-event profile synchronization → best-effort notification → ledger
//! record → acknowledgment. Only verification, classification, and store
//! failures propagate; everything else concludes in a 200-class outcome.

use std::sync::Arc;

use serde_json::json;

use crate::domain::billing::{
    BillingEvent, CheckoutSessionPayload, CustomerPayload, InvoicePayload, SubscriptionPayload,
    WebhookError, WebhookVerifier,
};
use crate::domain::profile::{ProfileUpdate, ProfileUpsert, SubscriptionStatus};
use crate::ports::{
    EmailTemplate, NotificationError, NotificationSender, ProfileRepository, SaveResult,
    WebhookEventRecord, WebhookEventRepository,
};

/// Command to handle a Stripe webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleStripeWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Stripe-Signature header value.
    pub signature: String,
}

/// Result of webhook processing. All variants acknowledge with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleStripeWebhookResult {
    /// A profile mutation was applied.
    Processed { event_type: String },
    /// The ledger already holds this event id; nothing was re-run.
    AlreadyProcessed { event_id: String },
    /// Deliberate no-op (unknown type, missing email, profile not found).
    Ignored { event_type: String, reason: String },
}

/// How one event's synchronization concluded.
enum SyncOutcome {
    Applied,
    Skipped(String),
}

/// Handler for processing Stripe webhook events.
///
/// Owns its collaborators explicitly; the verifier and the email sender are
/// optional because their credentials may be absent outside production. A
/// missing verifier is a configuration error (the webhook cannot do its job),
/// a missing email sender only degrades the best-effort notifications.
pub struct HandleStripeWebhookHandler {
    verifier: Option<WebhookVerifier>,
    profiles: Arc<dyn ProfileRepository>,
    webhook_events: Arc<dyn WebhookEventRepository>,
    notifications: Option<Arc<dyn NotificationSender>>,
    billing_update_url: String,
}

impl HandleStripeWebhookHandler {
    pub fn new(
        webhook_secret: Option<String>,
        profiles: Arc<dyn ProfileRepository>,
        webhook_events: Arc<dyn WebhookEventRepository>,
        notifications: Option<Arc<dyn NotificationSender>>,
        billing_update_url: impl Into<String>,
    ) -> Self {
        Self {
            verifier: webhook_secret.map(WebhookVerifier::new),
            profiles,
            webhook_events,
            notifications,
            billing_update_url: billing_update_url.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleStripeWebhookCommand,
    ) -> Result<HandleStripeWebhookResult, WebhookError> {
        // 1. Verify signature over the exact raw bytes, then parse.
        let verifier = self
            .verifier
            .as_ref()
            .ok_or(WebhookError::NotConfigured("STRIPE_WEBHOOK_SECRET"))?;
        let event = verifier.verify_and_parse(&cmd.payload, &cmd.signature)?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Processing Stripe webhook event"
        );

        // 2. Replays of an already-handled event short-circuit so side
        //    effects are not re-run.
        if let Some(record) = self.webhook_events.find_by_event_id(&event.id).await? {
            tracing::info!(
                event_id = %event.id,
                first_processed_at = %record.processed_at,
                "Duplicate delivery, skipping"
            );
            return Ok(HandleStripeWebhookResult::AlreadyProcessed {
                event_id: event.id,
            });
        }

        // 3. Decode into the closed variant set and synchronize.
        let billing_event = event.classify()?;
        let event_type = billing_event.type_str().to_string();
        let outcome = self.sync(billing_event).await?;

        // 4. Record the event id. Losing the insert race means a concurrent
        //    delivery finished first; still acknowledged.
        let record = match &outcome {
            SyncOutcome::Applied => WebhookEventRecord::success(&event.id, &event_type),
            SyncOutcome::Skipped(reason) => {
                WebhookEventRecord::ignored(&event.id, &event_type, reason.clone())
            }
        };
        if self.webhook_events.save(record).await? == SaveResult::AlreadyExists {
            tracing::debug!(event_id = %event.id, "Lost ledger insert race to a concurrent delivery");
        }

        Ok(match outcome {
            SyncOutcome::Applied => HandleStripeWebhookResult::Processed { event_type },
            SyncOutcome::Skipped(reason) => {
                HandleStripeWebhookResult::Ignored { event_type, reason }
            }
        })
    }

    /// Dispatch one classified event to its synchronization routine.
    async fn sync(&self, event: BillingEvent) -> Result<SyncOutcome, WebhookError> {
        match event {
            BillingEvent::CheckoutCompleted(session) => self.checkout_completed(session).await,
            BillingEvent::SubscriptionCreated(sub) | BillingEvent::SubscriptionUpdated(sub) => {
                self.subscription_status_changed(sub).await
            }
            BillingEvent::SubscriptionDeleted(sub) => {
                self.force_status(&sub.customer, SubscriptionStatus::Cancelled)
                    .await
            }
            BillingEvent::PaymentSucceeded(invoice) => {
                self.force_status(&invoice.customer, SubscriptionStatus::Active)
                    .await
            }
            BillingEvent::PaymentFailed(invoice) => self.payment_failed(invoice).await,
            BillingEvent::CustomerCreated(customer) => self.customer_created(customer).await,
            BillingEvent::CustomerUpdated(customer) => self.customer_updated(customer).await,
            BillingEvent::Unrecognized { raw_type } => {
                tracing::info!(event_type = %raw_type, "Unhandled event type, acknowledging");
                Ok(SyncOutcome::Skipped(format!(
                    "unrecognized event type: {}",
                    raw_type
                )))
            }
        }
    }

    /// `checkout.session.completed`: upsert by email, activate, welcome.
    async fn checkout_completed(
        &self,
        session: CheckoutSessionPayload,
    ) -> Result<SyncOutcome, WebhookError> {
        let Some(email) = session.email().map(str::to_string) else {
            tracing::warn!(session_id = %session.id, "Checkout session has no customer email");
            return Ok(SyncOutcome::Skipped(
                "checkout session has no customer email".to_string(),
            ));
        };

        let upsert = ProfileUpsert::checkout(&email, session.customer.clone());
        let profile = self.profiles.upsert_by_email(upsert).await?;
        tracing::info!(email = %email, profile_id = %profile.id, "Profile activated after checkout");

        let name = session.customer_name().unwrap_or("Brewer").to_string();
        self.notify(&email, EmailTemplate::Welcome, json!({ "name": name }))
            .await;

        Ok(SyncOutcome::Applied)
    }

    /// Subscription created/updated: map the provider status onto the profile.
    async fn subscription_status_changed(
        &self,
        subscription: SubscriptionPayload,
    ) -> Result<SyncOutcome, WebhookError> {
        let status = SubscriptionStatus::from_provider(&subscription.status);
        self.force_status(&subscription.customer, status).await
    }

    /// Write an absolute status for the profile linked to a customer id.
    async fn force_status(
        &self,
        customer_id: &str,
        status: SubscriptionStatus,
    ) -> Result<SyncOutcome, WebhookError> {
        let Some(profile) = self.profiles.find_by_stripe_customer_id(customer_id).await? else {
            return Ok(self.missing_profile(customer_id));
        };

        self.profiles
            .update_by_stripe_customer_id(customer_id, ProfileUpdate::status(status))
            .await?;
        tracing::info!(email = %profile.email, status = %status, "Subscription status updated");

        Ok(SyncOutcome::Applied)
    }

    /// `invoice.payment_failed`: deactivate, then nudge the customer.
    async fn payment_failed(&self, invoice: InvoicePayload) -> Result<SyncOutcome, WebhookError> {
        let Some(profile) = self
            .profiles
            .find_by_stripe_customer_id(&invoice.customer)
            .await?
        else {
            return Ok(self.missing_profile(&invoice.customer));
        };

        self.profiles
            .update_by_stripe_customer_id(
                &invoice.customer,
                ProfileUpdate::status(SubscriptionStatus::Inactive),
            )
            .await?;
        tracing::info!(email = %profile.email, "Payment failed, subscription deactivated");

        if let Some(email) = &invoice.customer_email {
            self.notify(
                email,
                EmailTemplate::PaymentFailed,
                json!({
                    "name": profile.display_name(),
                    "update_url": self.billing_update_url,
                }),
            )
            .await;
        }

        Ok(SyncOutcome::Applied)
    }

    /// `customer.created`: upsert contact fields by email, link the customer.
    async fn customer_created(
        &self,
        customer: CustomerPayload,
    ) -> Result<SyncOutcome, WebhookError> {
        let Some(email) = customer.email.clone() else {
            tracing::warn!(customer_id = %customer.id, "Customer has no email, skipping");
            return Ok(SyncOutcome::Skipped("customer has no email".to_string()));
        };

        let upsert = ProfileUpsert::customer(&email, &customer.id, customer.name.clone());
        self.profiles.upsert_by_email(upsert).await?;
        tracing::info!(email = %email, customer_id = %customer.id, "Customer linked to profile");

        Ok(SyncOutcome::Applied)
    }

    /// `customer.updated`: sync contact fields onto the linked profile.
    async fn customer_updated(
        &self,
        customer: CustomerPayload,
    ) -> Result<SyncOutcome, WebhookError> {
        let Some(email) = customer.email.clone() else {
            tracing::warn!(customer_id = %customer.id, "Customer has no email, skipping");
            return Ok(SyncOutcome::Skipped("customer has no email".to_string()));
        };

        let patch = ProfileUpdate::contact(&email, customer.name.clone());
        let updated = self
            .profiles
            .update_by_stripe_customer_id(&customer.id, patch)
            .await?;

        match updated {
            Some(_) => {
                tracing::info!(email = %email, customer_id = %customer.id, "Customer details updated");
                Ok(SyncOutcome::Applied)
            }
            None => Ok(self.missing_profile(&customer.id)),
        }
    }

    /// Out-of-order tolerance: a missing profile for an update-style event is
    /// a logged no-op, acknowledged so Stripe does not retry. The profile
    /// will be created by a later `customer.created` or checkout event.
    fn missing_profile(&self, customer_id: &str) -> SyncOutcome {
        tracing::warn!(customer_id = %customer_id, "No profile for customer, acknowledging without update");
        SyncOutcome::Skipped(format!("no profile for customer {}", customer_id))
    }

    /// Best-effort email dispatch. Failures are logged and dropped; the
    /// billing-state synchronization already succeeded, so failing the
    /// webhook would only trigger a redundant redelivery.
    async fn notify(&self, to: &str, template: EmailTemplate, data: serde_json::Value) {
        let result = match &self.notifications {
            Some(sender) => sender.send(to, template, data).await,
            None => Err(NotificationError::not_configured()),
        };

        match result {
            Ok(()) => tracing::info!(recipient = %to, template = %template, "Email sent"),
            Err(err) => {
                tracing::warn!(recipient = %to, template = %template, error = %err, "Best-effort email failed");
            }
        }
    }
}
