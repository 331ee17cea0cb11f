//! PostgreSQL implementation of ProfileRepository.
//!
//! Upserts are keyed on the `profiles_email_key` unique index so concurrent
//! webhook deliveries for the same email resolve to one row. `None` fields
//! in an upsert leave the existing column value untouched via COALESCE.

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId, Timestamp};
use crate::domain::profile::{Profile, ProfileUpdate, ProfileUpsert, SubscriptionStatus};
use crate::ports::ProfileRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the ProfileRepository port.
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    /// Creates a new PostgresProfileRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a profile.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    stripe_customer_id: Option<String>,
    subscription_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: ProfileId::from_uuid(row.id),
            email: row.email,
            full_name: row.full_name,
            stripe_customer_id: row.stripe_customer_id,
            subscription_status: parse_status(&row.subscription_status)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    match s {
        "active" => Ok(SubscriptionStatus::Active),
        "inactive" => Ok(SubscriptionStatus::Inactive),
        "cancelled" => Ok(SubscriptionStatus::Cancelled),
        "trial" => Ok(SubscriptionStatus::Trial),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid subscription_status value: {}", s),
        )),
    }
}

fn map_constraint_error(e: sqlx::Error, context: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.constraint() {
            Some("profiles_email_key") => {
                return DomainError::new(ErrorCode::DuplicateEmail, "Email already in use");
            }
            Some("profiles_stripe_customer_id_key") => {
                return DomainError::new(
                    ErrorCode::DuplicateCustomerId,
                    "Stripe customer id already linked to another profile",
                );
            }
            _ => {}
        }
    }
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

const PROFILE_COLUMNS: &str =
    "id, email, full_name, stripe_customer_id, subscription_status, created_at, updated_at";

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<Profile>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM profiles WHERE stripe_customer_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find profile: {}", e))
        })?;

        row.map(Profile::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM profiles WHERE email = $1",
            PROFILE_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find profile: {}", e))
        })?;

        row.map(Profile::try_from).transpose()
    }

    async fn upsert_by_email(&self, record: ProfileUpsert) -> Result<Profile, DomainError> {
        let status = record.subscription_status.map(|s| s.as_str());

        let row: ProfileRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO profiles (id, email, full_name, stripe_customer_id, subscription_status)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'inactive'))
            ON CONFLICT (email) DO UPDATE SET
                full_name = COALESCE(EXCLUDED.full_name, profiles.full_name),
                stripe_customer_id = COALESCE(EXCLUDED.stripe_customer_id, profiles.stripe_customer_id),
                subscription_status = COALESCE($5, profiles.subscription_status),
                updated_at = NOW()
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&record.email)
        .bind(&record.full_name)
        .bind(&record.stripe_customer_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Failed to upsert profile"))?;

        Profile::try_from(row)
    }

    async fn update_by_stripe_customer_id(
        &self,
        customer_id: &str,
        patch: ProfileUpdate,
    ) -> Result<Option<Profile>, DomainError> {
        // full_name is doubly optional: $4 says whether to touch the column
        // at all, $5 carries the value (possibly NULL to clear it).
        let set_full_name = patch.full_name.is_some();
        let full_name = patch.full_name.flatten();
        let status = patch.subscription_status.map(|s| s.as_str());

        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            r#"
            UPDATE profiles SET
                email = COALESCE($2, email),
                subscription_status = COALESCE($3, subscription_status),
                full_name = CASE WHEN $4 THEN $5 ELSE full_name END,
                updated_at = NOW()
            WHERE stripe_customer_id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(customer_id)
        .bind(&patch.email)
        .bind(status)
        .bind(set_full_name)
        .bind(&full_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Failed to update profile"))?;

        row.map(Profile::try_from).transpose()
    }
}
