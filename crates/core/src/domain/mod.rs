// Domain Layer - Pure business logic and entities

pub mod document;
pub mod error;
pub mod print_job;
pub mod probe;
pub mod trigger;

// Re-exports
pub use document::{Document, DocumentId, Template, TemplateId};
pub use error::DomainError;
pub use print_job::{resolve_queue_status, PrintJob, PrintJobId, PrintJobStatus, QueueEntry};
pub use probe::{FailureReason, ProbeOutcome, ProbeResponse};
pub use trigger::{is_public_ip, validate_probe_url, SystemId, Trigger, TriggerId, TriggerStatus};
