//! WebhookEventRepository port - idempotency ledger for processed events.
//!
//! Stripe delivers at-least-once: a timeout, a 5xx from us, or a lost 200
//! all trigger redelivery. The ledger records event ids that were handled to
//! completion so a replay acknowledges without re-running handlers or
//! re-sending side-effect emails.
//!
//! Only success and deliberately-ignored outcomes are recorded. A failed
//! delivery leaves no row, so the provider's retry reprocesses it cleanly
//! instead of being skipped by its own failure record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// How a recorded event was concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// A profile mutation was applied.
    Success,
    /// Deliberate no-op (unknown type, missing email, profile not found).
    Ignored,
}

impl ProcessingOutcome {
    /// Database string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingOutcome::Success => "success",
            ProcessingOutcome::Ignored => "ignored",
        }
    }
}

/// Record of a processed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Stripe event id (evt_xxx format), the primary key.
    pub event_id: String,

    /// Raw Stripe event type (e.g., "checkout.session.completed").
    pub event_type: String,

    /// When the event was processed.
    pub processed_at: DateTime<Utc>,

    /// How processing concluded.
    pub outcome: ProcessingOutcome,

    /// Why an ignored event was ignored.
    pub detail: Option<String>,
}

impl WebhookEventRecord {
    /// Record for an event whose profile mutation was applied.
    pub fn success(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            outcome: ProcessingOutcome::Success,
            detail: None,
        }
    }

    /// Record for an event concluded as a deliberate no-op.
    pub fn ignored(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            outcome: ProcessingOutcome::Ignored,
            detail: Some(reason.into()),
        }
    }
}

/// Result of attempting to save a webhook event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this event).
    Inserted,
    /// Record already exists (concurrent duplicate delivery lost the race).
    AlreadyExists,
}

/// Port for the processed-event ledger.
///
/// Implementations should rely on a PRIMARY KEY on `event_id` so concurrent
/// deliveries of the same event resolve to exactly one `Inserted`.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Find a previously processed event by its Stripe event id.
    ///
    /// Returns `None` if the event has not been processed.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Attempt to save a record with `ON CONFLICT DO NOTHING` semantics.
    ///
    /// Returns `SaveResult::Inserted` for the first writer,
    /// `SaveResult::AlreadyExists` for everyone else.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Delete records older than the given timestamp, returning how many
    /// were removed. Used for retention cleanup.
    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation for testing.
    struct InMemoryWebhookEventRepository {
        records: Arc<RwLock<HashMap<String, WebhookEventRecord>>>,
    }

    impl InMemoryWebhookEventRepository {
        fn new() -> Self {
            Self {
                records: Arc::new(RwLock::new(HashMap::new())),
            }
        }
    }

    #[async_trait]
    impl WebhookEventRepository for InMemoryWebhookEventRepository {
        async fn find_by_event_id(
            &self,
            event_id: &str,
        ) -> Result<Option<WebhookEventRecord>, DomainError> {
            let records = self.records.read().await;
            Ok(records.get(event_id).cloned())
        }

        async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
            let mut records = self.records.write().await;
            if records.contains_key(&record.event_id) {
                Ok(SaveResult::AlreadyExists)
            } else {
                records.insert(record.event_id.clone(), record);
                Ok(SaveResult::Inserted)
            }
        }

        async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|_, r| r.processed_at >= timestamp);
            Ok((before - records.len()) as u64)
        }
    }

    // ══════════════════════════════════════════════════════════════
    // WebhookEventRecord Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn success_record_has_no_detail() {
        let record = WebhookEventRecord::success("evt_123", "checkout.session.completed");

        assert_eq!(record.event_id, "evt_123");
        assert_eq!(record.outcome, ProcessingOutcome::Success);
        assert!(record.detail.is_none());
    }

    #[test]
    fn ignored_record_includes_reason() {
        let record = WebhookEventRecord::ignored(
            "evt_456",
            "customer.subscription.updated",
            "no profile for customer cus_1",
        );

        assert_eq!(record.outcome, ProcessingOutcome::Ignored);
        assert_eq!(
            record.detail.as_deref(),
            Some("no profile for customer cus_1")
        );
    }

    #[test]
    fn outcome_strings() {
        assert_eq!(ProcessingOutcome::Success.as_str(), "success");
        assert_eq!(ProcessingOutcome::Ignored.as_str(), "ignored");
    }

    // ══════════════════════════════════════════════════════════════
    // Repository Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn find_returns_none_for_new_event() {
        let repo = InMemoryWebhookEventRepository::new();

        let result = repo.find_by_event_id("evt_new").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn find_returns_record_after_save() {
        let repo = InMemoryWebhookEventRepository::new();
        let record = WebhookEventRecord::success("evt_saved", "checkout.session.completed");

        repo.save(record).await.unwrap();
        let found = repo.find_by_event_id("evt_saved").await.unwrap().unwrap();

        assert_eq!(found.event_id, "evt_saved");
        assert_eq!(found.outcome, ProcessingOutcome::Success);
    }

    #[tokio::test]
    async fn save_returns_inserted_then_already_exists() {
        let repo = InMemoryWebhookEventRepository::new();

        let first = repo
            .save(WebhookEventRecord::success("evt_dup", "type"))
            .await
            .unwrap();
        let second = repo
            .save(WebhookEventRecord::success("evt_dup", "type"))
            .await
            .unwrap();

        assert_eq!(first, SaveResult::Inserted);
        assert_eq!(second, SaveResult::AlreadyExists);
    }

    #[tokio::test]
    async fn delete_before_removes_old_records() {
        let repo = InMemoryWebhookEventRepository::new();

        let old_record = WebhookEventRecord {
            event_id: "evt_old".to_string(),
            event_type: "type".to_string(),
            processed_at: Utc::now() - chrono::Duration::days(60),
            outcome: ProcessingOutcome::Success,
            detail: None,
        };
        repo.save(old_record).await.unwrap();
        repo.save(WebhookEventRecord::success("evt_new", "type"))
            .await
            .unwrap();

        let cutoff = Utc::now() - chrono::Duration::days(30);
        let deleted = repo.delete_before(cutoff).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(repo.find_by_event_id("evt_old").await.unwrap().is_none());
        assert!(repo.find_by_event_id("evt_new").await.unwrap().is_some());
    }
}
