// Document Store Port (Interface)

use crate::domain::{Document, DocumentId};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence interface for documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document (its `id` is ignored) and return the assigned id
    async fn insert(&self, document: &Document) -> Result<DocumentId>;

    async fn list(&self) -> Result<Vec<Document>>;

    async fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>>;

    /// Every document owned by a system, in insertion order
    async fn find_by_system_id(&self, system_id: &str) -> Result<Vec<Document>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryDocumentStore {
        rows: Mutex<Vec<Document>>,
        fail_reads: Mutex<bool>,
    }

    impl InMemoryDocumentStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_documents(documents: Vec<Document>) -> Self {
            Self {
                rows: Mutex::new(documents),
                fail_reads: Mutex::new(false),
            }
        }

        pub fn set_fail_reads(&self, fail: bool) {
            *self.fail_reads.lock().unwrap() = fail;
        }

        fn check_reads(&self) -> Result<()> {
            if *self.fail_reads.lock().unwrap() {
                return Err(AppError::Database("injected read failure".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentStore for InMemoryDocumentStore {
        async fn insert(&self, document: &Document) -> Result<DocumentId> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.iter().map(|d| d.id).max().unwrap_or(0) + 1;
            let mut row = document.clone();
            row.id = id;
            rows.push(row);
            Ok(id)
        }

        async fn list(&self) -> Result<Vec<Document>> {
            self.check_reads()?;
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>> {
            self.check_reads()?;
            Ok(self.rows.lock().unwrap().iter().find(|d| d.id == id).cloned())
        }

        async fn find_by_system_id(&self, system_id: &str) -> Result<Vec<Document>> {
            self.check_reads()?;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.system_id == system_id)
                .cloned()
                .collect())
        }
    }
}
