// Port Layer - Interfaces for external dependencies

pub mod document_store;
pub mod health_probe;
pub mod print_job_store;
pub mod spooler;
pub mod template_store;
pub mod time_provider; // For deterministic testing
pub mod trigger_store;

// Re-exports
pub use document_store::DocumentStore;
pub use health_probe::HealthProbe;
pub use print_job_store::PrintJobStore;
pub use spooler::{JobHandle, SpoolerClient, SpoolerError};
pub use template_store::TemplateStore;
pub use time_provider::TimeProvider;
pub use trigger_store::TriggerStore;
