//! Axum router configuration for the billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{handle_stripe_webhook, health, list_plans, BillingAppState};

/// Create the billing API router.
///
/// # Routes
/// - `GET /plans` - List the subscription plan catalog
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new().route("/plans", get(list_plans))
}

/// Create the webhook router.
///
/// Separate from the billing routes because webhook deliveries carry no user
/// authentication; they are verified via signature.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhook events
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Create the health router.
///
/// # Routes
/// - `GET /health` - Liveness probe
pub fn health_routes() -> Router<BillingAppState> {
    Router::new().route("/health", get(health))
}

/// Create the complete application router.
///
/// Mounts the billing catalog under `/api/billing`, webhooks under
/// `/api/webhooks`, and the health probe at the root.
pub fn app_router(state: BillingAppState) -> Router {
    Router::new()
        .nest("/api/billing", billing_routes())
        .nest("/api/webhooks", webhook_routes())
        .merge(health_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use tower::util::ServiceExt;

    use crate::config::PaymentConfig;
    use crate::domain::billing::compute_test_signature;
    use crate::domain::foundation::DomainError;
    use crate::domain::profile::{Profile, ProfileUpdate, ProfileUpsert};
    use crate::ports::{
        ProfileRepository, SaveResult, WebhookEventRecord, WebhookEventRepository,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const TEST_SECRET: &str = "whsec_route_test_secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockProfileRepository {
        profiles: Mutex<Vec<Profile>>,
    }

    impl MockProfileRepository {
        fn new() -> Self {
            Self {
                profiles: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProfileRepository for MockProfileRepository {
        async fn find_by_stripe_customer_id(
            &self,
            customer_id: &str,
        ) -> Result<Option<Profile>, DomainError> {
            Ok(self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.stripe_customer_id.as_deref() == Some(customer_id))
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError> {
            Ok(self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.email == email)
                .cloned())
        }

        async fn upsert_by_email(&self, record: ProfileUpsert) -> Result<Profile, DomainError> {
            use crate::domain::foundation::{ProfileId, Timestamp};
            use crate::domain::profile::SubscriptionStatus;

            let profile = Profile {
                id: ProfileId::new(),
                email: record.email,
                full_name: record.full_name,
                stripe_customer_id: record.stripe_customer_id,
                subscription_status: record
                    .subscription_status
                    .unwrap_or(SubscriptionStatus::Inactive),
                created_at: Timestamp::now(),
                updated_at: Timestamp::now(),
            };
            self.profiles.lock().unwrap().push(profile.clone());
            Ok(profile)
        }

        async fn update_by_stripe_customer_id(
            &self,
            _customer_id: &str,
            _patch: ProfileUpdate,
        ) -> Result<Option<Profile>, DomainError> {
            Ok(None)
        }
    }

    struct InMemoryLedger {
        records: Mutex<HashMap<String, WebhookEventRecord>>,
    }

    impl InMemoryLedger {
        fn new() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl WebhookEventRepository for InMemoryLedger {
        async fn find_by_event_id(
            &self,
            event_id: &str,
        ) -> Result<Option<WebhookEventRecord>, DomainError> {
            Ok(self.records.lock().unwrap().get(event_id).cloned())
        }

        async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
            let mut records = self.records.lock().unwrap();
            if records.contains_key(&record.event_id) {
                Ok(SaveResult::AlreadyExists)
            } else {
                records.insert(record.event_id.clone(), record);
                Ok(SaveResult::Inserted)
            }
        }

        async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|_, r| r.processed_at >= timestamp);
            Ok((before - records.len()) as u64)
        }
    }

    fn test_state() -> BillingAppState {
        BillingAppState {
            profile_repository: Arc::new(MockProfileRepository::new()),
            webhook_event_repository: Arc::new(InMemoryLedger::new()),
            notification_sender: None,
            payment: PaymentConfig {
                stripe_webhook_secret: Some(TEST_SECRET.to_string()),
                stripe_basic_price_id: Some("price_basic_test".to_string()),
                ..Default::default()
            },
            billing_update_url: "https://breweryrecipes.com/account/billing".to_string(),
        }
    }

    fn signed_webhook_request(event_id: &str, event_type: &str) -> Request<Body> {
        let payload = serde_json::to_vec(&json!({
            "id": event_id,
            "type": event_type,
            "created": Utc::now().timestamp(),
            "data": {"object": {"id": "cs_1", "customer_email": "brewer@example.com"}},
            "livemode": false
        }))
        .unwrap();
        let timestamp = Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, &payload);

        Request::builder()
            .method("POST")
            .uri("/api/webhooks/stripe")
            .header("Stripe-Signature", format!("t={},v1={}", timestamp, signature))
            .header("content-type", "application/json")
            .body(Body::from(payload))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Route Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn health_returns_ok() {
        let app = app_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn plans_returns_full_catalog() {
        let app = app_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/billing/plans")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let plans = json["plans"].as_array().unwrap();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0]["tier"], "basic");
        assert_eq!(plans[0]["price_id"], "price_basic_test");
        assert_eq!(plans[2]["monthly_price_cents"], 7900);
        // Expert plan has no configured price id in this environment.
        assert!(plans[2].get("price_id").is_none());
    }

    #[tokio::test]
    async fn webhook_acknowledges_signed_delivery() {
        let app = app_router(test_state());

        let response = app
            .oneshot(signed_webhook_request("evt_1", "checkout.session.completed"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["received"], true);
    }

    #[tokio::test]
    async fn webhook_without_signature_header_is_rejected() {
        let app = app_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/stripe")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error_code"], "MISSING_SIGNATURE");
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_rejected() {
        let app = app_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/stripe")
                    .header("Stripe-Signature", "t=1704067200,v1=deadbeef")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_without_secret_configured_is_server_error() {
        let mut state = test_state();
        state.payment.stripe_webhook_secret = None;
        let app = app_router(state);

        let response = app
            .oneshot(signed_webhook_request("evt_2", "checkout.session.completed"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error_code"], "NOT_CONFIGURED");
    }
}
