// Watchdog - the entry points surrounding code may call
use crate::application::dispatcher::PrintDispatcher;
use crate::application::escalation::EscalationPolicy;
use crate::application::evaluator::{CheckSummary, TriggerEvaluator};
use crate::application::scheduler::{constants, Scheduler, SchedulerConfig};
use crate::application::tracker::{PrintJobTracker, StuckScanSummary};
use crate::domain::{DocumentId, PrintJob, PrintJobId};
use crate::error::Result;
use crate::port::{
    DocumentStore, HealthProbe, PrintJobStore, SpoolerClient, TemplateStore, TimeProvider,
    TriggerStore,
};
use std::sync::Arc;
use std::time::Duration;

/// The four persistence ports, bundled for wiring
#[derive(Clone)]
pub struct Stores {
    pub triggers: Arc<dyn TriggerStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub templates: Arc<dyn TemplateStore>,
    pub print_jobs: Arc<dyn PrintJobStore>,
}

/// Tunables that are process-wide rather than per trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogSettings {
    pub policy: EscalationPolicy,
    pub slow_response_threshold: Duration,
    pub scheduler: SchedulerConfig,
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            policy: EscalationPolicy::default(),
            slow_response_threshold: constants::SLOW_RESPONSE_THRESHOLD,
            scheduler: SchedulerConfig::default(),
        }
    }
}

/// Facade over evaluator, dispatcher and tracker
///
/// All methods are safe to call repeatedly and in any order.
pub struct Watchdog {
    evaluator: Arc<TriggerEvaluator>,
    dispatcher: Arc<PrintDispatcher>,
    tracker: Arc<PrintJobTracker>,
    settings: WatchdogSettings,
}

impl Watchdog {
    pub fn new(
        stores: Stores,
        spooler: Arc<dyn SpoolerClient>,
        probe: Arc<dyn HealthProbe>,
        time_provider: Arc<dyn TimeProvider>,
        settings: WatchdogSettings,
    ) -> Self {
        let dispatcher = Arc::new(PrintDispatcher::new(
            spooler,
            Arc::clone(&stores.print_jobs),
            Arc::clone(&time_provider),
        ));
        let tracker = Arc::new(PrintJobTracker::new(
            Arc::clone(&dispatcher),
            Arc::clone(&stores.print_jobs),
            Arc::clone(&time_provider),
        ));
        let evaluator = Arc::new(TriggerEvaluator::new(
            stores.triggers,
            stores.documents,
            stores.templates,
            probe,
            dispatcher.clone(),
            time_provider,
            settings.policy,
            settings.slow_response_threshold,
        ));

        Self {
            evaluator,
            dispatcher,
            tracker,
            settings,
        }
    }

    pub async fn check_all_triggers(&self) -> Result<CheckSummary> {
        self.evaluator.check_all_triggers().await
    }

    pub async fn check_stuck_jobs(&self, threshold: Duration) -> Result<StuckScanSummary> {
        self.tracker.check_stuck_jobs(threshold).await
    }

    pub async fn create_print_job(&self, document_id: DocumentId, file_path: &str) -> Result<PrintJob> {
        self.dispatcher.submit(document_id, file_path).await
    }

    pub async fn update_job_status(&self, job_id: PrintJobId) -> Result<PrintJob> {
        self.tracker.update_job_status(job_id).await
    }

    pub fn settings(&self) -> WatchdogSettings {
        self.settings
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(
            Arc::clone(&self.evaluator),
            Arc::clone(&self.tracker),
            self.settings.scheduler,
        )
    }
}
