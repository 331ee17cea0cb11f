//! Stripe webhook event types.
//!
//! The raw envelope is parsed first (after signature verification), then
//! classified into a closed set of [`BillingEvent`] variants at the router
//! boundary. Only fields the synchronizer reads are captured; the rest of
//! Stripe's schema is ignored.

use serde::{Deserialize, Serialize};

use super::WebhookError;

/// Stripe webhook event envelope (simplified).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Raw type string (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    pub livemode: bool,

    /// API version used to render this event.
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,

    /// Previous values for updated attributes (only for update events).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeEvent {
    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Decodes the envelope into a closed variant set.
    ///
    /// Recognized types carry a typed payload; anything else becomes
    /// [`BillingEvent::Unrecognized`] so the caller can acknowledge it as a
    /// deliberate no-op. A recognized type whose payload does not decode is
    /// a parse error, not an unknown event.
    pub fn classify(&self) -> Result<BillingEvent, WebhookError> {
        let event = match self.event_type.as_str() {
            "checkout.session.completed" => {
                BillingEvent::CheckoutCompleted(self.payload("checkout session")?)
            }
            "customer.subscription.created" => {
                BillingEvent::SubscriptionCreated(self.payload("subscription")?)
            }
            "customer.subscription.updated" => {
                BillingEvent::SubscriptionUpdated(self.payload("subscription")?)
            }
            "customer.subscription.deleted" => {
                BillingEvent::SubscriptionDeleted(self.payload("subscription")?)
            }
            "invoice.payment_succeeded" => BillingEvent::PaymentSucceeded(self.payload("invoice")?),
            "invoice.payment_failed" => BillingEvent::PaymentFailed(self.payload("invoice")?),
            "customer.created" => BillingEvent::CustomerCreated(self.payload("customer")?),
            "customer.updated" => BillingEvent::CustomerUpdated(self.payload("customer")?),
            other => BillingEvent::Unrecognized {
                raw_type: other.to_string(),
            },
        };
        Ok(event)
    }

    fn payload<T: serde::de::DeserializeOwned>(&self, kind: &str) -> Result<T, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::Parse(format!("invalid {} payload: {}", kind, e)))
    }
}

/// A verified event, decoded into exactly one handler's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    /// `checkout.session.completed` - a user finished paying.
    CheckoutCompleted(CheckoutSessionPayload),
    /// `customer.subscription.created`.
    SubscriptionCreated(SubscriptionPayload),
    /// `customer.subscription.updated`.
    SubscriptionUpdated(SubscriptionPayload),
    /// `customer.subscription.deleted` - subscription cancelled.
    SubscriptionDeleted(SubscriptionPayload),
    /// `invoice.payment_succeeded`.
    PaymentSucceeded(InvoicePayload),
    /// `invoice.payment_failed`.
    PaymentFailed(InvoicePayload),
    /// `customer.created`.
    CustomerCreated(CustomerPayload),
    /// `customer.updated`.
    CustomerUpdated(CustomerPayload),
    /// Any type outside the recognized set; acknowledged without action.
    Unrecognized { raw_type: String },
}

impl BillingEvent {
    /// The raw Stripe type string this variant was decoded from.
    pub fn type_str(&self) -> &str {
        match self {
            BillingEvent::CheckoutCompleted(_) => "checkout.session.completed",
            BillingEvent::SubscriptionCreated(_) => "customer.subscription.created",
            BillingEvent::SubscriptionUpdated(_) => "customer.subscription.updated",
            BillingEvent::SubscriptionDeleted(_) => "customer.subscription.deleted",
            BillingEvent::PaymentSucceeded(_) => "invoice.payment_succeeded",
            BillingEvent::PaymentFailed(_) => "invoice.payment_failed",
            BillingEvent::CustomerCreated(_) => "customer.created",
            BillingEvent::CustomerUpdated(_) => "customer.updated",
            BillingEvent::Unrecognized { raw_type } => raw_type,
        }
    }
}

/// Checkout session fields read by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckoutSessionPayload {
    /// Session id (cs_xxx).
    pub id: String,

    /// Stripe customer id, when the session created or reused one.
    #[serde(default)]
    pub customer: Option<String>,

    /// Email the session was started with.
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Details Stripe collected during checkout.
    #[serde(default)]
    pub customer_details: Option<CheckoutCustomerDetails>,
}

/// Customer details collected during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct CheckoutCustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CheckoutSessionPayload {
    /// The session's declared email, falling back to the collected details.
    pub fn email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .or_else(|| self.customer_details.as_ref()?.email.as_deref())
    }

    /// Name collected during checkout, when present.
    pub fn customer_name(&self) -> Option<&str> {
        self.customer_details.as_ref()?.name.as_deref()
    }
}

/// Subscription fields read by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubscriptionPayload {
    /// Subscription id (sub_xxx).
    pub id: String,

    /// Owning Stripe customer id.
    pub customer: String,

    /// Provider-side status string, mapped by the Status Mapper.
    pub status: String,
}

/// Invoice fields read by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InvoicePayload {
    /// Invoice id (in_xxx).
    pub id: String,

    /// Owning Stripe customer id.
    pub customer: String,

    /// Email attached to the invoice, used for the payment-failed notice.
    #[serde(default)]
    pub customer_email: Option<String>,
}

/// Customer fields read by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomerPayload {
    /// Stripe customer id (cus_xxx).
    pub id: String,

    /// Customer email; events without one are skipped.
    #[serde(default)]
    pub email: Option<String>,

    /// Display name, may be null when removed at the provider.
    #[serde(default)]
    pub name: Option<String>,
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: self.livemode,
            api_version: Some("2024-06-20".to_string()),
        }
    }
}
