//! NotificationSender port - transactional email dispatch.
//!
//! Emails in the webhook flow are best-effort side effects: the caller
//! receives a typed `Result` and deliberately logs-and-drops failures. No
//! retries happen at this layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Template kinds the billing flow sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailTemplate {
    /// Sent after a completed checkout.
    Welcome,
    /// Sent after a failed invoice payment.
    PaymentFailed,
}

impl EmailTemplate {
    /// Template key string, matching the platform's template registry.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplate::Welcome => "welcome",
            EmailTemplate::PaymentFailed => "payment-failed",
        }
    }
}

impl std::fmt::Display for EmailTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error categories for notification dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationErrorCode {
    /// Could not reach the email provider.
    NetworkError,
    /// Provider rejected our credentials.
    AuthenticationError,
    /// Provider rejected the request (bad recipient, malformed body).
    InvalidRequest,
    /// Provider accepted the request but reported a failure.
    ProviderError,
    /// No email client is configured in this environment.
    NotConfigured,
}

impl NotificationErrorCode {
    /// Whether a retry might succeed. Informational only: the webhook flow
    /// never retries emails.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NotificationErrorCode::NetworkError | NotificationErrorCode::ProviderError
        )
    }
}

/// Error from a notification dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationError {
    /// Error category.
    pub code: NotificationErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation could be retried.
    pub retryable: bool,
}

impl NotificationError {
    /// Create a new notification error.
    pub fn new(code: NotificationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(NotificationErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(NotificationErrorCode::AuthenticationError, message)
    }

    /// Create a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(NotificationErrorCode::ProviderError, message)
    }

    /// Create a not-configured error.
    pub fn not_configured() -> Self {
        Self::new(
            NotificationErrorCode::NotConfigured,
            "Email client is not configured",
        )
    }
}

impl std::fmt::Display for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for NotificationError {}

/// Port for sending transactional emails.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Send one email rendered from the given template and data.
    ///
    /// Callers in the webhook flow treat any error as a logged no-op.
    async fn send(
        &self,
        to: &str,
        template: EmailTemplate,
        data: serde_json::Value,
    ) -> Result<(), NotificationError>;
}
