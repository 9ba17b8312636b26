// SQLite TriggerStore Implementation

use crate::error::{ensure_affected, map_sqlx_error};
use async_trait::async_trait;
use blackoutbox_core::domain::{Trigger, TriggerId, TriggerStatus};
use blackoutbox_core::error::{AppError, Result};
use blackoutbox_core::port::TriggerStore;
use sqlx::SqlitePool;

const SELECT_TRIGGER: &str = r#"
    SELECT id, system_id, url, buffer_seconds, status, retry_count,
           last_failed_at, last_checked_at, created_at, updated_at
    FROM triggers
"#;

pub struct SqliteTriggerStore {
    pool: SqlitePool,
}

impl SqliteTriggerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TriggerStore for SqliteTriggerStore {
    async fn list(&self) -> Result<Vec<Trigger>> {
        let rows = sqlx::query_as::<_, TriggerRow>(&format!("{SELECT_TRIGGER} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(TriggerRow::into_trigger).collect()
    }

    async fn find_by_id(&self, id: TriggerId) -> Result<Option<Trigger>> {
        let row = sqlx::query_as::<_, TriggerRow>(&format!("{SELECT_TRIGGER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(TriggerRow::into_trigger).transpose()
    }

    async fn find_by_system_id(&self, system_id: &str) -> Result<Option<Trigger>> {
        let row = sqlx::query_as::<_, TriggerRow>(&format!(
            "{SELECT_TRIGGER} WHERE system_id = ? ORDER BY id LIMIT 1"
        ))
        .bind(system_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(TriggerRow::into_trigger).transpose()
    }

    async fn insert(&self, trigger: &Trigger) -> Result<TriggerId> {
        let result = sqlx::query(
            r#"
            INSERT INTO triggers (
                system_id, url, buffer_seconds, status, retry_count,
                last_failed_at, last_checked_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&trigger.system_id)
        .bind(&trigger.url)
        .bind(trigger.buffer_seconds)
        .bind(trigger.status.as_str())
        .bind(trigger.retry_count as i64)
        .bind(trigger.last_failed_at)
        .bind(trigger.last_checked_at)
        .bind(trigger.created_at)
        .bind(trigger.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, trigger: &Trigger) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE triggers
            SET system_id = ?, url = ?, buffer_seconds = ?, status = ?, retry_count = ?,
                last_failed_at = ?, last_checked_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&trigger.system_id)
        .bind(&trigger.url)
        .bind(trigger.buffer_seconds)
        .bind(trigger.status.as_str())
        .bind(trigger.retry_count as i64)
        .bind(trigger.last_failed_at)
        .bind(trigger.last_checked_at)
        .bind(trigger.updated_at)
        .bind(trigger.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        ensure_affected(result, "Trigger", trigger.id)
    }

    async fn update_status(&self, id: TriggerId, status: TriggerStatus) -> Result<()> {
        let result = sqlx::query("UPDATE triggers SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        ensure_affected(result, "Trigger", id)
    }

    async fn reset_retry_count(&self, id: TriggerId, checked_at: i64) -> Result<()> {
        // Single statement: the streak is cleared as one unit
        let result = sqlx::query(
            r#"
            UPDATE triggers
            SET retry_count = 0, last_failed_at = NULL, status = 'ok',
                last_checked_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(checked_at)
        .bind(checked_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        ensure_affected(result, "Trigger", id)
    }

    async fn delete(&self, id: TriggerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM triggers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        ensure_affected(result, "Trigger", id)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TriggerRow {
    id: i64,
    system_id: String,
    url: String,
    buffer_seconds: i64,
    status: String,
    retry_count: i64,
    last_failed_at: Option<i64>,
    last_checked_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TriggerRow {
    fn into_trigger(self) -> Result<Trigger> {
        let status: TriggerStatus = self.status.parse()?;
        let retry_count = u32::try_from(self.retry_count).map_err(|_| {
            AppError::Database(format!(
                "Trigger {} has invalid retry_count {}",
                self.id, self.retry_count
            ))
        })?;

        Ok(Trigger {
            id: self.id,
            system_id: self.system_id,
            url: self.url,
            buffer_seconds: self.buffer_seconds,
            status,
            retry_count,
            last_failed_at: self.last_failed_at,
            last_checked_at: self.last_checked_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn setup_test_db() -> SqliteTriggerStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteTriggerStore::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = setup_test_db().await;
        let trigger = Trigger::new(0, "sys-a", "https://a.example.com/health", 60, 1_000);

        let id = store.insert(&trigger).await.unwrap();
        assert!(id > 0);

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found, Trigger { id, ..trigger });
        assert_eq!(
            store.find_by_system_id("sys-a").await.unwrap().unwrap().id,
            id
        );
        assert!(store.find_by_system_id("sys-b").await.unwrap().is_none());
        assert!(store.find_by_id(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_persists_failure_state() {
        let store = setup_test_db().await;
        let id = store
            .insert(&Trigger::new(0, "sys-a", "https://a.example.com", 60, 0))
            .await
            .unwrap();

        let mut trigger = store.find_by_id(id).await.unwrap().unwrap();
        trigger.status = TriggerStatus::Triggered;
        trigger.retry_count = 3;
        trigger.last_failed_at = Some(0);
        trigger.last_checked_at = Some(60);
        trigger.updated_at = 60;
        store.update(&trigger).await.unwrap();

        assert_eq!(store.find_by_id(id).await.unwrap().unwrap(), trigger);
    }

    #[tokio::test]
    async fn test_reset_retry_count_clears_streak() {
        let store = setup_test_db().await;
        let mut trigger = Trigger::new(0, "sys-a", "https://a.example.com", 60, 0);
        trigger.status = TriggerStatus::Error;
        trigger.retry_count = 2;
        trigger.last_failed_at = Some(10);
        let id = store.insert(&trigger).await.unwrap();

        store.reset_retry_count(id, 90).await.unwrap();

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.status, TriggerStatus::Ok);
        assert_eq!(found.retry_count, 0);
        assert_eq!(found.last_failed_at, None);
        assert_eq!(found.last_checked_at, Some(90));
    }

    #[tokio::test]
    async fn test_mutations_on_missing_row_are_not_found() {
        let store = setup_test_db().await;
        let ghost = Trigger::new(42, "sys-a", "https://a.example.com", 60, 0);

        assert!(store.update(&ghost).await.unwrap_err().is_not_found());
        assert!(store
            .update_status(42, TriggerStatus::Ok)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.reset_retry_count(42, 0).await.unwrap_err().is_not_found());
        assert!(store.delete(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_status_and_delete() {
        let store = setup_test_db().await;
        let id = store
            .insert(&Trigger::new(0, "sys-a", "https://a.example.com", 60, 0))
            .await
            .unwrap();

        store.update_status(id, TriggerStatus::Triggered).await.unwrap();
        assert!(store.find_by_id(id).await.unwrap().unwrap().is_triggered());

        store.delete(id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_status_is_domain_error() {
        let store = setup_test_db().await;
        let id = store
            .insert(&Trigger::new(0, "sys-a", "https://a.example.com", 60, 0))
            .await
            .unwrap();
        sqlx::query("UPDATE triggers SET status = 'sleeping' WHERE id = ?")
            .bind(id)
            .execute(&store.pool)
            .await
            .unwrap();

        let err = store.find_by_id(id).await.unwrap_err();
        assert!(matches!(err, AppError::Domain(_)));
    }
}
