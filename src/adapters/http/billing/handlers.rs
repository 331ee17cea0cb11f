//! HTTP handlers for the billing endpoints.
//!
//! These handlers connect Axum routes to the application layer. The webhook
//! handler is deliberately thin: raw body extraction and the signature
//! header live here, everything else happens in the command handler.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    HandleStripeWebhookCommand, HandleStripeWebhookHandler,
};
use crate::config::PaymentConfig;
use crate::domain::billing::{SubscriptionPlan, WebhookError};
use crate::ports::{NotificationSender, ProfileRepository, WebhookEventRepository};

use super::dto::{ErrorResponse, HealthResponse, PlanResponse, PlansResponse, WebhookAck};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped. The notification
/// sender is optional because the email credential may be absent outside
/// production; the webhook secret likewise.
#[derive(Clone)]
pub struct BillingAppState {
    pub profile_repository: Arc<dyn ProfileRepository>,
    pub webhook_event_repository: Arc<dyn WebhookEventRepository>,
    pub notification_sender: Option<Arc<dyn NotificationSender>>,
    pub payment: PaymentConfig,
    pub billing_update_url: String,
}

impl BillingAppState {
    /// Create the webhook command handler from the shared state.
    pub fn webhook_handler(&self) -> HandleStripeWebhookHandler {
        HandleStripeWebhookHandler::new(
            self.payment.stripe_webhook_secret.clone(),
            self.profile_repository.clone(),
            self.webhook_event_repository.clone(),
            self.notification_sender.clone(),
            self.billing_update_url.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Handle Stripe webhook events
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;

    let handler = state.webhook_handler();
    let cmd = HandleStripeWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    handler.handle(cmd).await?;

    Ok(Json(WebhookAck::received()))
}

/// GET /api/billing/plans - List the subscription plan catalog
pub async fn list_plans(State(state): State<BillingAppState>) -> impl IntoResponse {
    let plans = SubscriptionPlan::catalog()
        .iter()
        .map(|plan| PlanResponse::from_plan(plan, &state.payment))
        .collect();

    Json(PlansResponse { plans })
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();

        // 5xx details stay in the logs; Stripe's dashboard shows response
        // bodies to anyone with account access.
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Webhook processing failed");
        } else {
            tracing::warn!(error = %self.0, "Webhook delivery rejected");
        }

        let body = ErrorResponse::new(self.0.error_code(), self.0.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use axum::http::StatusCode;

    #[test]
    fn api_error_maps_missing_signature_to_400() {
        let err = WebhookApiError(WebhookError::MissingSignature);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_invalid_signature_to_400() {
        let err = WebhookApiError(WebhookError::InvalidSignature);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_parse_failure_to_400() {
        let err = WebhookApiError(WebhookError::Parse("bad json".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_missing_configuration_to_500() {
        let err = WebhookApiError(WebhookError::NotConfigured("STRIPE_WEBHOOK_SECRET"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn api_error_maps_store_failure_to_500() {
        let err = WebhookApiError(WebhookError::Store(DomainError::new(
            ErrorCode::DatabaseError,
            "connection refused",
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
