// Trigger Store Port (Interface)

use crate::domain::{Trigger, TriggerId, TriggerStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence interface for triggers
///
/// Lookups report a missing row as `Ok(None)`; mutations addressing a
/// missing row fail with `AppError::NotFound`.
#[async_trait]
pub trait TriggerStore: Send + Sync {
    /// All triggers, any status
    async fn list(&self) -> Result<Vec<Trigger>>;

    async fn find_by_id(&self, id: TriggerId) -> Result<Option<Trigger>>;

    async fn find_by_system_id(&self, system_id: &str) -> Result<Option<Trigger>>;

    /// Insert a new trigger (its `id` is ignored) and return the assigned id
    async fn insert(&self, trigger: &Trigger) -> Result<TriggerId>;

    /// Overwrite every mutable field
    async fn update(&self, trigger: &Trigger) -> Result<()>;

    async fn update_status(&self, id: TriggerId, status: TriggerStatus) -> Result<()>;

    /// Atomically clear the failure streak: retry_count=0, last_failed_at=NULL, status=ok
    async fn reset_retry_count(&self, id: TriggerId, checked_at: i64) -> Result<()>;

    async fn delete(&self, id: TriggerId) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// In-memory TriggerStore with optional failure injection
    #[derive(Default)]
    pub struct InMemoryTriggerStore {
        rows: Mutex<BTreeMap<TriggerId, Trigger>>,
        next_id: Mutex<TriggerId>,
        fail_writes: Mutex<bool>,
        write_count: Mutex<usize>,
    }

    impl InMemoryTriggerStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a trigger, keeping its id
        pub fn with_trigger(self, trigger: Trigger) -> Self {
            {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id = (*next_id).max(trigger.id);
            }
            self.rows.lock().unwrap().insert(trigger.id, trigger);
            self
        }

        pub fn get(&self, id: TriggerId) -> Option<Trigger> {
            self.rows.lock().unwrap().get(&id).cloned()
        }

        pub fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        /// Number of successful mutations so far
        pub fn write_count(&self) -> usize {
            *self.write_count.lock().unwrap()
        }

        fn write<F>(&self, id: TriggerId, f: F) -> Result<()>
        where
            F: FnOnce(&mut Trigger),
        {
            if *self.fail_writes.lock().unwrap() {
                return Err(AppError::Database("injected write failure".to_string()));
            }
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Trigger {} not found", id)))?;
            f(row);
            *self.write_count.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl TriggerStore for InMemoryTriggerStore {
        async fn list(&self) -> Result<Vec<Trigger>> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn find_by_id(&self, id: TriggerId) -> Result<Option<Trigger>> {
            Ok(self.get(id))
        }

        async fn find_by_system_id(&self, system_id: &str) -> Result<Option<Trigger>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .find(|t| t.system_id == system_id)
                .cloned())
        }

        async fn insert(&self, trigger: &Trigger) -> Result<TriggerId> {
            let id = {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                *next_id
            };
            let mut row = trigger.clone();
            row.id = id;
            self.rows.lock().unwrap().insert(id, row);
            Ok(id)
        }

        async fn update(&self, trigger: &Trigger) -> Result<()> {
            let updated = trigger.clone();
            self.write(trigger.id, move |row| *row = updated)
        }

        async fn update_status(&self, id: TriggerId, status: TriggerStatus) -> Result<()> {
            self.write(id, |row| row.status = status)
        }

        async fn reset_retry_count(&self, id: TriggerId, checked_at: i64) -> Result<()> {
            self.write(id, |row| {
                row.retry_count = 0;
                row.last_failed_at = None;
                row.status = TriggerStatus::Ok;
                row.last_checked_at = Some(checked_at);
            })
        }

        async fn delete(&self, id: TriggerId) -> Result<()> {
            self.rows
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| AppError::NotFound(format!("Trigger {} not found", id)))
        }
    }
}
