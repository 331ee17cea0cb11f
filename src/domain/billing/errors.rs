//! Webhook error taxonomy.
//!
//! Every failure the webhook path can hit, with the HTTP status it surfaces
//! as and whether Stripe's redelivery is expected to fix it.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur while handling a Stripe webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The Stripe-Signature header was absent from the request.
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    /// Signature verification failed (wrong secret or tampered body).
    #[error("Invalid signature")]
    InvalidSignature,

    /// Event timestamp is older than the replay window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the signature header, envelope, or a typed payload.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required credential is absent from configuration.
    #[error("Not configured: {0}")]
    NotConfigured(&'static str),

    /// Profile store or idempotency ledger operation failed.
    #[error("Store error: {0}")]
    Store(#[from] DomainError),
}

impl WebhookError {
    /// Whether Stripe should redeliver this event.
    ///
    /// Only store failures are transient; everything else is either
    /// tampering/misconfiguration (fix the config, not the delivery) or a
    /// malformed payload a retry cannot repair.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Store(_))
    }

    /// Maps the error to the HTTP status returned to Stripe.
    ///
    /// - 400: the delivery itself is bad; Stripe does not retry
    /// - 500: our side failed; Stripe retries, safe because handlers are
    ///   idempotent
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::Parse(_) => StatusCode::BAD_REQUEST,

            WebhookError::NotConfigured(_) | WebhookError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code for the error envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::TimestampOutOfRange => "TIMESTAMP_OUT_OF_RANGE",
            WebhookError::InvalidTimestamp => "INVALID_TIMESTAMP",
            WebhookError::Parse(_) => "PARSE_ERROR",
            WebhookError::NotConfigured(_) => "NOT_CONFIGURED",
            WebhookError::Store(_) => "STORE_ERROR",
        }
    }
}
