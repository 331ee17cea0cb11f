//! PostgreSQL implementation of the webhook event ledger.
//!
//! The `webhook_events` table carries a PRIMARY KEY on `event_id`, so the
//! insert uses `ON CONFLICT DO NOTHING` and reads `rows_affected` to tell
//! the first writer apart from a concurrent duplicate delivery.

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ProcessingOutcome, SaveResult, WebhookEventRecord, WebhookEventRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the WebhookEventRepository port.
pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    /// Creates a new PostgresWebhookEventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    processed_at: DateTime<Utc>,
    outcome: String,
    detail: Option<String>,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        Ok(WebhookEventRecord {
            event_id: row.event_id,
            event_type: row.event_type,
            processed_at: row.processed_at,
            outcome: parse_outcome(&row.outcome)?,
            detail: row.detail,
        })
    }
}

fn parse_outcome(s: &str) -> Result<ProcessingOutcome, DomainError> {
    match s {
        "success" => Ok(ProcessingOutcome::Success),
        "ignored" => Ok(ProcessingOutcome::Ignored),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid outcome value: {}", s),
        )),
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, processed_at, outcome, detail
            FROM webhook_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find webhook event: {}", e),
            )
        })?;

        row.map(WebhookEventRecord::try_from).transpose()
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhook_events (event_id, event_type, processed_at, outcome, detail)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.processed_at)
        .bind(record.outcome.as_str())
        .bind(&record.detail)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save webhook event: {}", e),
            )
        })?;

        if result.rows_affected() == 1 {
            Ok(SaveResult::Inserted)
        } else {
            Ok(SaveResult::AlreadyExists)
        }
    }

    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM webhook_events WHERE processed_at < $1")
            .bind(timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to delete webhook events: {}", e),
                )
            })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_outcome_accepts_stored_values() {
        assert_eq!(parse_outcome("success").unwrap(), ProcessingOutcome::Success);
        assert_eq!(parse_outcome("ignored").unwrap(), ProcessingOutcome::Ignored);
    }

    #[test]
    fn parse_outcome_rejects_unknown_values() {
        assert!(parse_outcome("failed").is_err());
        assert!(parse_outcome("").is_err());
    }

    #[test]
    fn row_conversion_preserves_fields() {
        let now = Utc::now();
        let row = WebhookEventRow {
            event_id: "evt_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            processed_at: now,
            outcome: "ignored".to_string(),
            detail: Some("checkout session has no customer email".to_string()),
        };

        let record = WebhookEventRecord::try_from(row).unwrap();
        assert_eq!(record.event_id, "evt_123");
        assert_eq!(record.outcome, ProcessingOutcome::Ignored);
        assert_eq!(record.processed_at, now);
        assert!(record.detail.is_some());
    }
}
