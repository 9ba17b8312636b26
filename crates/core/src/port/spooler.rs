// Spooler Port (Interface)
//
// Narrow capability over the external print spooler. Adapters shell out to
// the real programs; the parsing of their text output stays behind this seam.

use crate::domain::QueueEntry;
use async_trait::async_trait;
use thiserror::Error;

/// A job accepted by the spooler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Spooler-assigned job id (numeric suffix of the request id)
    pub job_id: String,
    /// Raw submit output, kept for logging
    pub output: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpoolerError {
    #[error("failed to run {command}: {reason}")]
    Spawn { command: String, reason: String },

    #[error("{command} exited with {status}: {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("could not find a job id in {command} output: {output}")]
    UnparsableOutput { command: String, output: String },

    #[error("{command} did not finish within {secs}s")]
    Timeout { command: String, secs: u64 },
}

#[async_trait]
pub trait SpoolerClient: Send + Sync {
    /// Submit a file for printing
    async fn submit(&self, file_path: &str) -> std::result::Result<JobHandle, SpoolerError>;

    /// Current queue listing, one entry per line
    async fn list_queue(&self) -> std::result::Result<Vec<QueueEntry>, SpoolerError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Spooler double: accepts every file with increasing job ids unless a
    /// path was told to fail; serves a fixed queue listing.
    pub struct MockSpooler {
        next_job_id: Mutex<u64>,
        failing_paths: Mutex<HashMap<String, SpoolerError>>,
        queue: Mutex<std::result::Result<Vec<QueueEntry>, SpoolerError>>,
        submitted: Mutex<Vec<String>>,
        queue_calls: Mutex<usize>,
    }

    impl Default for MockSpooler {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockSpooler {
        pub fn new() -> Self {
            Self {
                next_job_id: Mutex::new(100),
                failing_paths: Mutex::new(HashMap::new()),
                queue: Mutex::new(Ok(Vec::new())),
                submitted: Mutex::new(Vec::new()),
                queue_calls: Mutex::new(0),
            }
        }

        /// First job id handed out
        pub fn starting_at(self, job_id: u64) -> Self {
            *self.next_job_id.lock().unwrap() = job_id;
            self
        }

        pub fn fail_path(&self, path: impl Into<String>, error: SpoolerError) {
            self.failing_paths.lock().unwrap().insert(path.into(), error);
        }

        pub fn set_queue<I, S>(&self, lines: I)
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            *self.queue.lock().unwrap() = Ok(lines.into_iter().map(QueueEntry::new).collect());
        }

        pub fn fail_queue(&self, error: SpoolerError) {
            *self.queue.lock().unwrap() = Err(error);
        }

        /// Every path passed to `submit`, failures included
        pub fn submitted_paths(&self) -> Vec<String> {
            self.submitted.lock().unwrap().clone()
        }

        pub fn queue_calls(&self) -> usize {
            *self.queue_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl SpoolerClient for MockSpooler {
        async fn submit(&self, file_path: &str) -> std::result::Result<JobHandle, SpoolerError> {
            self.submitted.lock().unwrap().push(file_path.to_string());

            if let Some(error) = self.failing_paths.lock().unwrap().get(file_path) {
                return Err(error.clone());
            }

            let mut next = self.next_job_id.lock().unwrap();
            let job_id = next.to_string();
            *next += 1;
            Ok(JobHandle {
                output: format!("request id is mock-{} (1 file(s))", job_id),
                job_id,
            })
        }

        async fn list_queue(&self) -> std::result::Result<Vec<QueueEntry>, SpoolerError> {
            *self.queue_calls.lock().unwrap() += 1;
            self.queue.lock().unwrap().clone()
        }
    }
}
