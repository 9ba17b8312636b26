// Escalation policy: the trigger failure/success state machine
use crate::application::scheduler::constants::DEFAULT_RETRY_THRESHOLD;
use crate::domain::{ProbeOutcome, Trigger, TriggerStatus};

/// Result of applying one probe outcome to a trigger
///
/// Every variant carries the trigger as it must be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerTransition {
    /// Success after a failure streak; failure state cleared
    Recovered(Trigger),
    /// Success with nothing to clear
    Healthy(Trigger),
    /// First failure of a streak; `last_failed_at` latched
    FirstFailure(Trigger),
    /// Failure that does not (yet) warrant escalation
    StillFailing(Trigger),
    /// Retry floor and buffer window both passed; trigger is now `triggered`
    Escalated(Trigger),
}

impl TriggerTransition {
    pub fn trigger(&self) -> &Trigger {
        match self {
            TriggerTransition::Recovered(t)
            | TriggerTransition::Healthy(t)
            | TriggerTransition::FirstFailure(t)
            | TriggerTransition::StillFailing(t)
            | TriggerTransition::Escalated(t) => t,
        }
    }

    pub fn into_trigger(self) -> Trigger {
        match self {
            TriggerTransition::Recovered(t)
            | TriggerTransition::Healthy(t)
            | TriggerTransition::FirstFailure(t)
            | TriggerTransition::StillFailing(t)
            | TriggerTransition::Escalated(t) => t,
        }
    }

    pub fn is_escalation(&self) -> bool {
        matches!(self, TriggerTransition::Escalated(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            TriggerTransition::Recovered(_) => "recovered",
            TriggerTransition::Healthy(_) => "healthy",
            TriggerTransition::FirstFailure(_) => "first_failure",
            TriggerTransition::StillFailing(_) => "still_failing",
            TriggerTransition::Escalated(_) => "escalated",
        }
    }
}

/// Escalation policy
///
/// A failing trigger escalates once it has failed at least `retry_threshold`
/// consecutive times AND its first failure is at least `buffer_seconds` old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    pub retry_threshold: u32,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            retry_threshold: DEFAULT_RETRY_THRESHOLD,
        }
    }
}

impl EscalationPolicy {
    pub fn new(retry_threshold: u32) -> Self {
        Self { retry_threshold }
    }

    /// Apply `outcome` to `trigger` observed at `now` (Unix seconds)
    ///
    /// Pure: the input is left untouched. `last_checked_at` and `updated_at`
    /// are stamped on every transition.
    pub fn next(&self, trigger: &Trigger, outcome: &ProbeOutcome, now: i64) -> TriggerTransition {
        let mut next = trigger.clone();
        next.last_checked_at = Some(now);
        next.updated_at = now;

        if outcome.is_success() {
            if trigger.in_failure_streak() {
                next.retry_count = 0;
                next.last_failed_at = None;
                next.status = TriggerStatus::Ok;
                return TriggerTransition::Recovered(next);
            }
            return TriggerTransition::Healthy(next);
        }

        let first_failed_at = match trigger.last_failed_at {
            None => {
                next.last_failed_at = Some(now);
                next.status = TriggerStatus::Error;
                next.retry_count = 1;
                return TriggerTransition::FirstFailure(next);
            }
            Some(at) => at,
        };

        next.retry_count = trigger.retry_count.saturating_add(1);
        let buffer_elapsed = now - first_failed_at >= trigger.buffer_seconds;

        if next.retry_count >= self.retry_threshold && buffer_elapsed {
            next.status = TriggerStatus::Triggered;
            return TriggerTransition::Escalated(next);
        }

        TriggerTransition::StillFailing(next)
    }
}
