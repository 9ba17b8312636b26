// Print Job Domain Model
//
// Lifecycle: submitted (printing) or rejected (failed) at dispatch time, then
// moved between printing/completed/failed as the spooler queue changes.

use super::document::DocumentId;
use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Print Job ID (SQLite rowid)
pub type PrintJobId = i64;

/// Print job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintJobStatus {
    Pending,
    Printing,
    Completed,
    Failed,
}

impl PrintJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintJobStatus::Pending => "pending",
            PrintJobStatus::Printing => "printing",
            PrintJobStatus::Completed => "completed",
            PrintJobStatus::Failed => "failed",
        }
    }

    /// Pending and printing jobs can still change on the spooler side
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrintJobStatus::Completed | PrintJobStatus::Failed)
    }

    /// Map a spooler state token (case-insensitive) to a job status
    ///
    /// Returns None for tokens with no defined meaning.
    pub fn from_spooler_state(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "active" | "printing" => Some(PrintJobStatus::Printing),
            "completed" | "done" => Some(PrintJobStatus::Completed),
            "held" | "error" => Some(PrintJobStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrintJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintJobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(PrintJobStatus::Pending),
            "printing" => Ok(PrintJobStatus::Printing),
            "completed" => Ok(PrintJobStatus::Completed),
            "failed" => Ok(PrintJobStatus::Failed),
            other => Err(DomainError::InvalidPrintJobStatus(other.to_string())),
        }
    }
}

/// Print Job Entity
///
/// Invariants:
/// - `cups_job_id` is None only for jobs rejected at submission time
/// - `completed_at` is Some iff `status == Completed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: PrintJobId,
    /// Document or template id
    pub document_id: DocumentId,
    pub cups_job_id: Option<String>,
    pub status: PrintJobStatus,
    pub submitted_at: i64,
    pub completed_at: Option<i64>,
    pub error_message: Option<String>,
}

impl PrintJob {
    /// Job accepted by the spooler
    pub fn submitted(document_id: DocumentId, cups_job_id: impl Into<String>, now: i64) -> Self {
        Self {
            id: 0,
            document_id,
            cups_job_id: Some(cups_job_id.into()),
            status: PrintJobStatus::Printing,
            submitted_at: now,
            completed_at: None,
            error_message: None,
        }
    }

    /// Job the spooler refused, or whose id could not be read back
    pub fn rejected(document_id: DocumentId, error_message: impl Into<String>, now: i64) -> Self {
        Self {
            id: 0,
            document_id,
            cups_job_id: None,
            status: PrintJobStatus::Failed,
            submitted_at: now,
            completed_at: None,
            error_message: Some(error_message.into()),
        }
    }

    /// Move to `status`, keeping `completed_at` in step
    ///
    /// Returns false (and leaves the job untouched) when nothing changes.
    pub fn transition_to(&mut self, status: PrintJobStatus, now: i64) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.completed_at = match status {
            PrintJobStatus::Completed => Some(now),
            _ => None,
        };
        true
    }

    /// Non-terminal and submitted strictly before `older_than`
    pub fn is_stuck(&self, older_than: i64) -> bool {
        !self.status.is_terminal() && self.submitted_at < older_than
    }
}

/// One line of the spooler's queue listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub line: String,
}

impl QueueEntry {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.line.split_whitespace()
    }

    /// Whether any whitespace-delimited field is exactly `job_id`
    pub fn mentions(&self, job_id: &str) -> bool {
        self.fields().any(|field| field == job_id)
    }

    /// The 4th whitespace-delimited field
    pub fn state_token(&self) -> Option<&str> {
        self.fields().nth(3)
    }
}

/// Derive a job's status from the spooler queue
///
/// The first line naming the job with a recognised state wins. A job that is
/// not (or no longer meaningfully) listed has left the queue: Completed.
pub fn resolve_queue_status(entries: &[QueueEntry], cups_job_id: &str) -> PrintJobStatus {
    entries
        .iter()
        .filter(|entry| entry.mentions(cups_job_id))
        .find_map(|entry| entry.state_token().and_then(PrintJobStatus::from_spooler_state))
        .unwrap_or(PrintJobStatus::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spooler_state_mapping() {
        assert_eq!(
            PrintJobStatus::from_spooler_state("ACTIVE"),
            Some(PrintJobStatus::Printing)
        );
        assert_eq!(
            PrintJobStatus::from_spooler_state("printing"),
            Some(PrintJobStatus::Printing)
        );
        assert_eq!(
            PrintJobStatus::from_spooler_state("Done"),
            Some(PrintJobStatus::Completed)
        );
        assert_eq!(
            PrintJobStatus::from_spooler_state("held"),
            Some(PrintJobStatus::Failed)
        );
        assert_eq!(
            PrintJobStatus::from_spooler_state("error"),
            Some(PrintJobStatus::Failed)
        );
        assert_eq!(PrintJobStatus::from_spooler_state("1st"), None);
    }

    #[test]
    fn test_resolve_active_line_is_printing() {
        let entries = vec![
            QueueEntry::new("Rank    Owner   Job     File(s)"),
            QueueEntry::new("482  user  3  active  report.pdf"),
        ];
        assert_eq!(resolve_queue_status(&entries, "482"), PrintJobStatus::Printing);
    }

    #[test]
    fn test_resolve_absent_job_is_completed() {
        let entries = vec![QueueEntry::new("483  user  3  active  other.pdf")];
        assert_eq!(resolve_queue_status(&entries, "482"), PrintJobStatus::Completed);
        assert_eq!(resolve_queue_status(&[], "482"), PrintJobStatus::Completed);
    }

    #[test]
    fn test_resolve_does_not_match_id_prefixes() {
        let entries = vec![QueueEntry::new("4821  user  3  held  other.pdf")];
        assert_eq!(resolve_queue_status(&entries, "482"), PrintJobStatus::Completed);
    }

    #[test]
    fn test_resolve_unknown_token_counts_as_completed() {
        let entries = vec![QueueEntry::new("482  user  3  queued  report.pdf")];
        assert_eq!(resolve_queue_status(&entries, "482"), PrintJobStatus::Completed);
    }

    #[test]
    fn test_transition_keeps_completed_at_in_step() {
        let mut job = PrintJob::submitted(7, "482", 100);
        assert!(!job.transition_to(PrintJobStatus::Printing, 150));

        assert!(job.transition_to(PrintJobStatus::Completed, 200));
        assert_eq!(job.completed_at, Some(200));

        assert!(job.transition_to(PrintJobStatus::Printing, 250));
        assert_eq!(job.completed_at, None);
    }

    #[test]
    fn test_is_stuck_only_for_old_non_terminal_jobs() {
        let job = PrintJob::submitted(1, "1", 100);
        assert!(job.is_stuck(101));
        assert!(!job.is_stuck(100));

        let failed = PrintJob::rejected(1, "lp missing", 100);
        assert!(!failed.is_stuck(1_000));
    }
}
