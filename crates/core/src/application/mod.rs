// Application Layer - Use Cases and Business Logic

pub mod dispatcher;
pub mod escalation;
pub mod evaluator;
pub mod scheduler;
pub mod service;
pub mod tracker;

// Re-exports
pub use dispatcher::{PrintDispatcher, PrintJobCreator};
pub use escalation::{EscalationPolicy, TriggerTransition};
pub use evaluator::{CheckSummary, FanOutSummary, TriggerEvaluator};
pub use scheduler::{stop_channel, Scheduler, SchedulerConfig, StopHandle, StopToken};
pub use service::{Stores, Watchdog, WatchdogSettings};
pub use tracker::{stuck_cutoff, PrintJobTracker, StuckScanSummary};
