//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.

mod notification_sender;
mod profile_repository;
mod webhook_event_repository;

pub use notification_sender::{
    EmailTemplate, NotificationError, NotificationErrorCode, NotificationSender,
};
pub use profile_repository::ProfileRepository;
pub use webhook_event_repository::{
    ProcessingOutcome, SaveResult, WebhookEventRecord, WebhookEventRepository,
};
