//! Resend implementation of the NotificationSender port.
//!
//! Renders the platform's transactional templates to inline-styled HTML and
//! posts them to the Resend REST API. Callers treat failures as best-effort,
//! so this adapter maps errors to categories and never retries.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

use crate::ports::{EmailTemplate, NotificationError, NotificationSender};

const RESEND_API_BASE: &str = "https://api.resend.com";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Resend API client implementing the NotificationSender port.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: SecretString,
    from: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

impl ResendMailer {
    /// Creates a mailer sending from the given address ("Name <addr>" form).
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(SEND_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: SecretString::new(api_key.into()),
            from: from.into(),
            base_url: RESEND_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL. Test hook.
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn subject_for(template: EmailTemplate) -> &'static str {
    match template {
        EmailTemplate::Welcome => "Welcome to Brewery Recipe Platform! \u{1f37a}",
        EmailTemplate::PaymentFailed => "Payment Update Required",
    }
}

fn render_html(template: EmailTemplate, data: &serde_json::Value) -> String {
    let name = data
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("Brewer");

    match template {
        EmailTemplate::Welcome => format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1>Welcome to Brewery Recipe Platform!</h1>
  <p>Hi {name},</p>
  <p>Welcome to the most personalized brewing experience! We're excited to help you discover amazing recipes tailored to your equipment and preferences.</p>
  <p>Your subscription is now active and you'll receive your first personalized recipe recommendations soon.</p>
  <p>Happy brewing!</p>
  <p>The Brewery Recipe Team</p>
</div>"#
        ),
        EmailTemplate::PaymentFailed => {
            let update_url = data.get("update_url").and_then(|v| v.as_str()).unwrap_or("");
            format!(
                r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1>Payment Update Required</h1>
  <p>Hi {name},</p>
  <p>We encountered an issue processing your payment for your Brewery Recipe subscription.</p>
  <p>Please update your payment method to continue receiving your personalized recipes.</p>
  <a href="{update_url}" style="background: #6366f1; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px;">Update Payment Method</a>
  <p>If you have any questions, please contact our support team.</p>
  <p>The Brewery Recipe Team</p>
</div>"#
            )
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> NotificationError {
    if e.is_timeout() || e.is_connect() {
        NotificationError::network(format!("Resend request failed: {}", e))
    } else {
        NotificationError::provider(format!("Resend request failed: {}", e))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> NotificationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            NotificationError::authentication(format!("Resend rejected credentials: {}", body))
        }
        s if s.is_client_error() => NotificationError::new(
            crate::ports::NotificationErrorCode::InvalidRequest,
            format!("Resend rejected request ({}): {}", s, body),
        ),
        s => NotificationError::provider(format!("Resend error ({}): {}", s, body)),
    }
}

#[async_trait]
impl NotificationSender for ResendMailer {
    async fn send(
        &self,
        to: &str,
        template: EmailTemplate,
        data: serde_json::Value,
    ) -> Result<(), NotificationError> {
        let request = SendEmailRequest {
            from: &self.from,
            to: [to],
            subject: subject_for(template),
            html: render_html(template, &data),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(template = %template, "Resend accepted email");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(map_status_error(status, &body))
        }
    }
}
