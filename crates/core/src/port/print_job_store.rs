// Print Job Store Port (Interface)

use crate::domain::{DocumentId, PrintJob, PrintJobId, PrintJobStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence interface for print jobs
#[async_trait]
pub trait PrintJobStore: Send + Sync {
    /// Insert a new job (its `id` is ignored) and return the assigned id
    async fn insert(&self, job: &PrintJob) -> Result<PrintJobId>;

    async fn list(&self) -> Result<Vec<PrintJob>>;

    async fn find_by_id(&self, id: PrintJobId) -> Result<Option<PrintJob>>;

    async fn find_by_document_id(&self, document_id: DocumentId) -> Result<Vec<PrintJob>>;

    /// Pending/printing jobs with `submitted_at < older_than`
    async fn find_stuck(&self, older_than: i64) -> Result<Vec<PrintJob>>;

    /// Overwrite every mutable field
    async fn update(&self, job: &PrintJob) -> Result<()>;

    async fn update_status(&self, id: PrintJobId, status: PrintJobStatus) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryPrintJobStore {
        rows: Mutex<Vec<PrintJob>>,
        fail_inserts: Mutex<bool>,
    }

    impl InMemoryPrintJobStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a job, keeping its id
        pub fn with_job(self, job: PrintJob) -> Self {
            self.rows.lock().unwrap().push(job);
            self
        }

        pub fn jobs(&self) -> Vec<PrintJob> {
            self.rows.lock().unwrap().clone()
        }

        pub fn get(&self, id: PrintJobId) -> Option<PrintJob> {
            self.rows.lock().unwrap().iter().find(|j| j.id == id).cloned()
        }

        pub fn set_fail_inserts(&self, fail: bool) {
            *self.fail_inserts.lock().unwrap() = fail;
        }

        fn not_found(id: PrintJobId) -> AppError {
            AppError::NotFound(format!("Print job {} not found", id))
        }
    }

    #[async_trait]
    impl PrintJobStore for InMemoryPrintJobStore {
        async fn insert(&self, job: &PrintJob) -> Result<PrintJobId> {
            if *self.fail_inserts.lock().unwrap() {
                return Err(AppError::Database("injected insert failure".to_string()));
            }
            let mut rows = self.rows.lock().unwrap();
            let id = rows.iter().map(|j| j.id).max().unwrap_or(0) + 1;
            let mut row = job.clone();
            row.id = id;
            rows.push(row);
            Ok(id)
        }

        async fn list(&self) -> Result<Vec<PrintJob>> {
            Ok(self.jobs())
        }

        async fn find_by_id(&self, id: PrintJobId) -> Result<Option<PrintJob>> {
            Ok(self.get(id))
        }

        async fn find_by_document_id(&self, document_id: DocumentId) -> Result<Vec<PrintJob>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|j| j.document_id == document_id)
                .cloned()
                .collect())
        }

        async fn find_stuck(&self, older_than: i64) -> Result<Vec<PrintJob>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|j| j.is_stuck(older_than))
                .cloned()
                .collect())
        }

        async fn update(&self, job: &PrintJob) -> Result<()> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|j| j.id == job.id)
                .ok_or_else(|| Self::not_found(job.id))?;
            *row = job.clone();
            Ok(())
        }

        async fn update_status(&self, id: PrintJobId, status: PrintJobStatus) -> Result<()> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|j| j.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            row.status = status;
            Ok(())
        }
    }
}
