// Trigger evaluation: probe, classify, transition, persist, escalate
use crate::application::dispatcher::PrintJobCreator;
use crate::application::escalation::{EscalationPolicy, TriggerTransition};
use crate::domain::{ProbeOutcome, Trigger};
use crate::error::Result;
use crate::port::{DocumentStore, HealthProbe, TemplateStore, TimeProvider, TriggerStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Outcome of one pass over every trigger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    /// Already-triggered triggers left alone
    pub skipped: usize,
    pub escalated: usize,
    pub errors: usize,
}

/// Outcome of an escalation fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutSummary {
    pub submitted: usize,
    pub failed: usize,
}

pub struct TriggerEvaluator {
    triggers: Arc<dyn TriggerStore>,
    documents: Arc<dyn DocumentStore>,
    templates: Arc<dyn TemplateStore>,
    probe: Arc<dyn HealthProbe>,
    printer: Arc<dyn PrintJobCreator>,
    time_provider: Arc<dyn TimeProvider>,
    policy: EscalationPolicy,
    slow_threshold: Duration,
}

impl TriggerEvaluator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        triggers: Arc<dyn TriggerStore>,
        documents: Arc<dyn DocumentStore>,
        templates: Arc<dyn TemplateStore>,
        probe: Arc<dyn HealthProbe>,
        printer: Arc<dyn PrintJobCreator>,
        time_provider: Arc<dyn TimeProvider>,
        policy: EscalationPolicy,
        slow_threshold: Duration,
    ) -> Self {
        Self {
            triggers,
            documents,
            templates,
            probe,
            printer,
            time_provider,
            policy,
            slow_threshold,
        }
    }

    /// Evaluate every trigger that has not escalated yet, one at a time
    ///
    /// A failure on one trigger is logged and counted; the pass continues.
    pub async fn check_all_triggers(&self) -> Result<CheckSummary> {
        let triggers = self.triggers.list().await?;
        let mut summary = CheckSummary::default();

        for trigger in triggers {
            if trigger.is_triggered() {
                summary.skipped += 1;
                continue;
            }
            let trigger_id = trigger.id;
            match self.evaluate(trigger).await {
                Ok(transition) => {
                    summary.checked += 1;
                    if transition.is_escalation() {
                        summary.escalated += 1;
                    }
                }
                Err(e) => {
                    summary.errors += 1;
                    error!(trigger_id = %trigger_id, error = %e, "Failed to check trigger");
                }
            }
        }

        debug!(
            checked = summary.checked,
            skipped = summary.skipped,
            escalated = summary.escalated,
            errors = summary.errors,
            "Trigger check pass finished"
        );
        Ok(summary)
    }

    /// Probe one trigger and apply the result
    ///
    /// A `triggered` trigger is returned unchanged (as `StillFailing`)
    /// without probing.
    pub async fn evaluate(&self, trigger: Trigger) -> Result<TriggerTransition> {
        if trigger.is_triggered() {
            return Ok(TriggerTransition::StillFailing(trigger));
        }

        let response = self.probe.probe(&trigger.url).await?;
        let outcome = ProbeOutcome::classify(&response, self.slow_threshold);
        let now = self.time_provider.now_secs();

        debug!(
            trigger_id = %trigger.id,
            url = %trigger.url,
            response = ?response,
            "Health check finished"
        );

        let transition = self.policy.next(&trigger, &outcome, now);
        self.persist(&transition, now).await?;

        match (&transition, &outcome) {
            (TriggerTransition::Recovered(t), _) => {
                info!(trigger_id = %t.id, system_id = %t.system_id, "Trigger recovered");
            }
            (TriggerTransition::FirstFailure(t), ProbeOutcome::Failure(reason))
            | (TriggerTransition::StillFailing(t), ProbeOutcome::Failure(reason)) => {
                warn!(
                    trigger_id = %t.id,
                    system_id = %t.system_id,
                    retry_count = t.retry_count,
                    reason = %reason,
                    "Health check failed"
                );
            }
            (TriggerTransition::Escalated(t), _) => {
                warn!(
                    trigger_id = %t.id,
                    system_id = %t.system_id,
                    retry_count = t.retry_count,
                    "Trigger escalated, dispatching print jobs"
                );
                self.fan_out(t).await?;
            }
            _ => {}
        }

        Ok(transition)
    }

    async fn persist(&self, transition: &TriggerTransition, now: i64) -> Result<()> {
        match transition {
            TriggerTransition::Recovered(t) => self.triggers.reset_retry_count(t.id, now).await,
            other => self.triggers.update(other.trigger()).await,
        }
    }

    /// Submit a print job for every document of the trigger's system, plus
    /// one for the matching template when there is one
    ///
    /// Only the document lookup itself can fail the fan-out; everything per
    /// document is logged and skipped.
    pub async fn fan_out(&self, trigger: &Trigger) -> Result<FanOutSummary> {
        let documents = self.documents.find_by_system_id(&trigger.system_id).await?;
        let mut summary = FanOutSummary::default();

        for document in documents {
            let template = match self
                .templates
                .find_by_file_reference(&document.file_reference)
                .await
            {
                Ok(template) => template,
                Err(e) => {
                    warn!(
                        document_id = %document.id,
                        file_reference = %document.file_reference,
                        error = %e,
                        "Template lookup failed"
                    );
                    None
                }
            };

            match self
                .printer
                .create_print_job(document.id, &document.file_path)
                .await
            {
                Ok(_) => summary.submitted += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        trigger_id = %trigger.id,
                        document_id = %document.id,
                        error = %e,
                        "Failed to print document"
                    );
                }
            }

            if let Some(template) = template {
                match self
                    .printer
                    .create_print_job(template.id, &template.file_path)
                    .await
                {
                    Ok(_) => summary.submitted += 1,
                    Err(e) => {
                        summary.failed += 1;
                        error!(
                            trigger_id = %trigger.id,
                            template_id = %template.id,
                            error = %e,
                            "Failed to print template"
                        );
                    }
                }
            }
        }

        info!(
            trigger_id = %trigger.id,
            system_id = %trigger.system_id,
            submitted = summary.submitted,
            failed = summary.failed,
            "Escalation fan-out finished"
        );
        Ok(summary)
    }
}
