//! PostgreSQL adapter implementations.

mod profile_repository;
mod webhook_event_repository;

pub use profile_repository::PostgresProfileRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;
