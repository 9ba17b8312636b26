// Template Store Port (Interface)

use crate::domain::{Template, TemplateId};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence interface for templates
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Insert a new template (its `id` is ignored) and return the assigned id
    async fn insert(&self, template: &Template) -> Result<TemplateId>;

    async fn list(&self) -> Result<Vec<Template>>;

    async fn find_by_id(&self, id: TemplateId) -> Result<Option<Template>>;

    /// Template for a file reference; the most recently created wins
    async fn find_by_file_reference(&self, file_reference: &str) -> Result<Option<Template>>;

    async fn find_by_system_id(&self, system_id: &str) -> Result<Vec<Template>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryTemplateStore {
        rows: Mutex<Vec<Template>>,
        /// File references whose lookup fails
        failing_references: Mutex<HashSet<String>>,
    }

    impl InMemoryTemplateStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_templates(templates: Vec<Template>) -> Self {
            Self {
                rows: Mutex::new(templates),
                failing_references: Mutex::new(HashSet::new()),
            }
        }

        pub fn fail_lookups_for(&self, file_reference: impl Into<String>) {
            self.failing_references
                .lock()
                .unwrap()
                .insert(file_reference.into());
        }
    }

    #[async_trait]
    impl TemplateStore for InMemoryTemplateStore {
        async fn insert(&self, template: &Template) -> Result<TemplateId> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            let mut row = template.clone();
            row.id = id;
            rows.push(row);
            Ok(id)
        }

        async fn list(&self) -> Result<Vec<Template>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn find_by_id(&self, id: TemplateId) -> Result<Option<Template>> {
            Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
        }

        async fn find_by_file_reference(&self, file_reference: &str) -> Result<Option<Template>> {
            if self.failing_references.lock().unwrap().contains(file_reference) {
                return Err(AppError::Database(format!(
                    "injected lookup failure for {}",
                    file_reference
                )));
            }
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.file_reference == file_reference)
                .max_by_key(|t| (t.created_at, t.id))
                .cloned())
        }

        async fn find_by_system_id(&self, system_id: &str) -> Result<Vec<Template>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.system_id == system_id)
                .cloned()
                .collect())
        }
    }
}
