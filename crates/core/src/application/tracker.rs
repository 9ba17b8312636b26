// Print job tracking: reconcile stored jobs with the spooler queue
use crate::application::dispatcher::PrintDispatcher;
use crate::domain::{PrintJob, PrintJobId, PrintJobStatus};
use crate::error::{AppError, Result};
use crate::port::{PrintJobStore, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of one stuck-job scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StuckScanSummary {
    /// Jobs matching the stuck criteria
    pub found: usize,
    /// Jobs whose status was polled successfully
    pub refreshed: usize,
    /// Jobs with no spooler id to poll
    pub skipped: usize,
    pub errors: usize,
}

/// Keeps print job status in step with the spooler
pub struct PrintJobTracker {
    dispatcher: Arc<PrintDispatcher>,
    print_jobs: Arc<dyn PrintJobStore>,
    time_provider: Arc<dyn TimeProvider>,
}

impl PrintJobTracker {
    pub fn new(
        dispatcher: Arc<PrintDispatcher>,
        print_jobs: Arc<dyn PrintJobStore>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            dispatcher,
            print_jobs,
            time_provider,
        }
    }

    /// Poll the spooler for one job and persist any status change
    ///
    /// # Errors
    /// - `NotFound` if the job does not exist
    /// - `InvalidState` if the job never reached the spooler
    pub async fn update_job_status(&self, id: PrintJobId) -> Result<PrintJob> {
        let job = self
            .print_jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Print job {} not found", id)))?;
        self.refresh(job).await
    }

    async fn refresh(&self, mut job: PrintJob) -> Result<PrintJob> {
        let cups_job_id = job.cups_job_id.clone().ok_or_else(|| {
            AppError::InvalidState(format!("Print job {} has no spooler job id", job.id))
        })?;

        let status = self.dispatcher.check_job_status(&cups_job_id).await?;
        let previous = job.status;
        let now = self.time_provider.now_secs();

        if !job.transition_to(status, now) {
            debug!(job_id = %job.id, status = %status, "Print job status unchanged");
            return Ok(job);
        }

        // completed_at moves only when Completed is entered or left
        if status == PrintJobStatus::Completed || previous == PrintJobStatus::Completed {
            self.print_jobs.update(&job).await?;
        } else {
            self.print_jobs.update_status(job.id, status).await?;
        }

        info!(
            job_id = %job.id,
            cups_job_id = %cups_job_id,
            from = %previous,
            to = %status,
            "Print job status changed"
        );
        Ok(job)
    }

    /// Refresh every job stuck in pending/printing for longer than `threshold`
    ///
    /// A failure on one job is logged and the scan moves on.
    pub async fn check_stuck_jobs(&self, threshold: Duration) -> Result<StuckScanSummary> {
        let cutoff = stuck_cutoff(self.time_provider.now_secs(), threshold);
        let stuck: Vec<PrintJob> = self
            .print_jobs
            .find_stuck(cutoff)
            .await?
            .into_iter()
            .filter(|job| job.is_stuck(cutoff))
            .collect();

        let mut summary = StuckScanSummary {
            found: stuck.len(),
            ..Default::default()
        };

        for job in stuck {
            if job.cups_job_id.is_none() {
                summary.skipped += 1;
                continue;
            }
            let job_id = job.id;
            match self.refresh(job).await {
                Ok(_) => summary.refreshed += 1,
                Err(e) => {
                    summary.errors += 1;
                    warn!(job_id = %job_id, error = %e, "Failed to update stuck print job");
                }
            }
        }

        if summary.found > 0 {
            info!(
                found = summary.found,
                refreshed = summary.refreshed,
                skipped = summary.skipped,
                errors = summary.errors,
                "Stuck print job scan finished"
            );
        }
        Ok(summary)
    }
}

/// Submission time before which an unfinished job counts as stuck
///
/// Saturates instead of wrapping for thresholds beyond `i64::MAX` seconds.
pub fn stuck_cutoff(now: i64, threshold: Duration) -> i64 {
    let threshold = i64::try_from(threshold.as_secs()).unwrap_or(i64::MAX);
    now.saturating_sub(threshold)
}
