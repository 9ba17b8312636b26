// Print dispatch: submit to the spooler and record every outcome
use crate::domain::{resolve_queue_status, DocumentId, PrintJob, PrintJobStatus};
use crate::error::Result;
use crate::port::{PrintJobStore, SpoolerClient, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Something that turns a file into a recorded print job
///
/// The evaluator depends on this seam rather than on `PrintDispatcher`
/// directly so escalation fan-out can be observed in tests.
#[async_trait]
pub trait PrintJobCreator: Send + Sync {
    async fn create_print_job(&self, document_id: DocumentId, file_path: &str) -> Result<PrintJob>;
}

/// Submits files to the spooler and persists the resulting jobs
pub struct PrintDispatcher {
    spooler: Arc<dyn SpoolerClient>,
    print_jobs: Arc<dyn PrintJobStore>,
    time_provider: Arc<dyn TimeProvider>,
}

impl PrintDispatcher {
    pub fn new(
        spooler: Arc<dyn SpoolerClient>,
        print_jobs: Arc<dyn PrintJobStore>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            spooler,
            print_jobs,
            time_provider,
        }
    }

    /// Submit `file_path` on behalf of `document_id`
    ///
    /// Exactly one job is persisted per call: `printing` with the spooler job
    /// id on success, `failed` with the error text otherwise. A spooler
    /// failure is returned to the caller after it has been recorded.
    pub async fn submit(&self, document_id: DocumentId, file_path: &str) -> Result<PrintJob> {
        let now = self.time_provider.now_secs();

        let handle = match self.spooler.submit(file_path).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(
                    document_id = %document_id,
                    file_path = %file_path,
                    error = %e,
                    "Print submission failed"
                );
                let job = PrintJob::rejected(document_id, e.to_string(), now);
                if let Err(store_err) = self.print_jobs.insert(&job).await {
                    error!(
                        document_id = %document_id,
                        error = %store_err,
                        "Failed to record rejected print job"
                    );
                }
                return Err(e.into());
            }
        };

        let mut job = PrintJob::submitted(document_id, handle.job_id, now);
        job.id = self.print_jobs.insert(&job).await?;

        info!(
            job_id = %job.id,
            document_id = %document_id,
            cups_job_id = ?job.cups_job_id,
            "Print job submitted"
        );
        Ok(job)
    }

    /// Current status of a spooler job, derived from the queue listing
    pub async fn check_job_status(&self, cups_job_id: &str) -> Result<PrintJobStatus> {
        let entries = self.spooler.list_queue().await?;
        Ok(resolve_queue_status(&entries, cups_job_id))
    }
}

#[async_trait]
impl PrintJobCreator for PrintDispatcher {
    async fn create_print_job(&self, document_id: DocumentId, file_path: &str) -> Result<PrintJob> {
        self.submit(document_id, file_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::port::print_job_store::mocks::InMemoryPrintJobStore;
    use crate::port::spooler::mocks::MockSpooler;
    use crate::port::time_provider::mocks::ManualClock;
    use crate::port::SpoolerError;

    fn setup() -> (Arc<MockSpooler>, Arc<InMemoryPrintJobStore>, PrintDispatcher) {
        let spooler = Arc::new(MockSpooler::new().starting_at(482));
        let jobs = Arc::new(InMemoryPrintJobStore::new());
        let dispatcher = PrintDispatcher::new(
            spooler.clone(),
            jobs.clone(),
            Arc::new(ManualClock::new(1_000)),
        );
        (spooler, jobs, dispatcher)
    }

    #[tokio::test]
    async fn test_submit_records_printing_job() {
        let (spooler, jobs, dispatcher) = setup();

        let job = dispatcher.submit(7, "/docs/a.pdf").await.unwrap();

        assert_eq!(job.id, 1);
        assert_eq!(job.status, PrintJobStatus::Printing);
        assert_eq!(job.cups_job_id.as_deref(), Some("482"));
        assert_eq!(job.submitted_at, 1_000);
        assert_eq!(jobs.jobs(), vec![job]);
        assert_eq!(spooler.submitted_paths(), vec!["/docs/a.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_failure_records_failed_job_and_errors() {
        let (spooler, jobs, dispatcher) = setup();
        spooler.fail_path(
            "/docs/a.pdf",
            SpoolerError::UnparsableOutput {
                command: "lp".to_string(),
                output: "garbage".to_string(),
            },
        );

        let err = dispatcher.submit(7, "/docs/a.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::Spooler(_)));

        let recorded = jobs.jobs();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].status, PrintJobStatus::Failed);
        assert_eq!(recorded[0].cups_job_id, None);
        assert!(recorded[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("garbage"));
    }

    #[tokio::test]
    async fn test_spooler_error_wins_over_store_error() {
        let (spooler, jobs, dispatcher) = setup();
        spooler.fail_path(
            "/x",
            SpoolerError::Spawn {
                command: "lp".to_string(),
                reason: "not found".to_string(),
            },
        );
        jobs.set_fail_inserts(true);

        let err = dispatcher.submit(1, "/x").await.unwrap_err();
        assert!(matches!(err, AppError::Spooler(SpoolerError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_check_job_status_reads_queue() {
        let (spooler, _jobs, dispatcher) = setup();
        spooler.set_queue(["482  user  3  active  report.pdf"]);

        assert_eq!(
            dispatcher.check_job_status("482").await.unwrap(),
            PrintJobStatus::Printing
        );
        assert_eq!(
            dispatcher.check_job_status("999").await.unwrap(),
            PrintJobStatus::Completed
        );
    }
}
