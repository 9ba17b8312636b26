// Scheduler - periodic driver for trigger checks and stuck-job scans

pub mod constants;
mod stop;

pub use stop::{stop_channel, StopHandle, StopToken};

use crate::application::evaluator::TriggerEvaluator;
use crate::application::tracker::PrintJobTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub stuck_job_threshold: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: constants::CHECK_INTERVAL,
            stuck_job_threshold: constants::STUCK_JOB_THRESHOLD,
        }
    }
}

/// Single background loop: every tick, check all triggers, then scan for
/// stuck print jobs
///
/// The stop signal is honoured between ticks only; a tick in progress
/// always runs to completion.
pub struct Scheduler {
    evaluator: Arc<TriggerEvaluator>,
    tracker: Arc<PrintJobTracker>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        evaluator: Arc<TriggerEvaluator>,
        tracker: Arc<PrintJobTracker>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            evaluator,
            tracker,
            config,
        }
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Run until `stop` fires
    ///
    /// The first tick happens one full interval after start.
    pub async fn run(&self, mut stop: StopToken) {
        let period = self.config.tick_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            tick_interval_secs = period.as_secs(),
            stuck_job_threshold_secs = self.config.stuck_job_threshold.as_secs(),
            "Scheduler started"
        );

        loop {
            if stop.is_stopped() {
                break;
            }
            tokio::select! {
                biased;
                _ = stop.wait() => break,
                _ = ticker.tick() => self.tick().await,
            }
        }

        info!("Scheduler stopped");
    }

    /// Run one tick in its own task so a panic is contained
    pub async fn tick(&self) {
        let evaluator = Arc::clone(&self.evaluator);
        let tracker = Arc::clone(&self.tracker);
        let threshold = self.config.stuck_job_threshold;

        let handle = tokio::spawn(async move { run_tick(&evaluator, &tracker, threshold).await });

        if let Err(e) = handle.await {
            if e.is_panic() {
                error!(error = %e, "Scheduler tick panicked");
            } else {
                error!(error = %e, "Scheduler tick was cancelled");
            }
        }
    }
}

async fn run_tick(evaluator: &TriggerEvaluator, tracker: &PrintJobTracker, threshold: Duration) {
    if let Err(e) = evaluator.check_all_triggers().await {
        error!(error = %e, "Trigger check failed");
    }
    if let Err(e) = tracker.check_stuck_jobs(threshold).await {
        error!(error = %e, "Stuck print job scan failed");
    }
}
