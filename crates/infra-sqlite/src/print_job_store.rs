// SQLite PrintJobStore Implementation

use crate::error::{ensure_affected, map_sqlx_error};
use async_trait::async_trait;
use blackoutbox_core::domain::{DocumentId, PrintJob, PrintJobId, PrintJobStatus};
use blackoutbox_core::error::Result;
use blackoutbox_core::port::PrintJobStore;
use sqlx::SqlitePool;

const SELECT_PRINT_JOB: &str = r#"
    SELECT id, document_id, cups_job_id, status, submitted_at, completed_at, error_message
    FROM print_jobs
"#;

pub struct SqlitePrintJobStore {
    pool: SqlitePool,
}

impl SqlitePrintJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, sql: &str, bind: Option<i64>) -> Result<Vec<PrintJob>> {
        let mut query = sqlx::query_as::<_, PrintJobRow>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;

        rows.into_iter().map(PrintJobRow::into_print_job).collect()
    }
}

#[async_trait]
impl PrintJobStore for SqlitePrintJobStore {
    async fn insert(&self, job: &PrintJob) -> Result<PrintJobId> {
        let result = sqlx::query(
            r#"
            INSERT INTO print_jobs (
                document_id, cups_job_id, status, submitted_at, completed_at, error_message
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(job.document_id)
        .bind(&job.cups_job_id)
        .bind(job.status.as_str())
        .bind(job.submitted_at)
        .bind(job.completed_at)
        .bind(&job.error_message)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn list(&self) -> Result<Vec<PrintJob>> {
        self.fetch_all(&format!("{SELECT_PRINT_JOB} ORDER BY id"), None)
            .await
    }

    async fn find_by_id(&self, id: PrintJobId) -> Result<Option<PrintJob>> {
        let row = sqlx::query_as::<_, PrintJobRow>(&format!("{SELECT_PRINT_JOB} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(PrintJobRow::into_print_job).transpose()
    }

    async fn find_by_document_id(&self, document_id: DocumentId) -> Result<Vec<PrintJob>> {
        self.fetch_all(
            &format!("{SELECT_PRINT_JOB} WHERE document_id = ? ORDER BY id"),
            Some(document_id),
        )
        .await
    }

    async fn find_stuck(&self, older_than: i64) -> Result<Vec<PrintJob>> {
        // Served by idx_print_jobs_status_submitted
        self.fetch_all(
            &format!(
                "{SELECT_PRINT_JOB} WHERE status IN ('pending', 'printing') \
                 AND submitted_at < ? ORDER BY submitted_at, id"
            ),
            Some(older_than),
        )
        .await
    }

    async fn update(&self, job: &PrintJob) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE print_jobs
            SET document_id = ?, cups_job_id = ?, status = ?, submitted_at = ?,
                completed_at = ?, error_message = ?
            WHERE id = ?
            "#,
        )
        .bind(job.document_id)
        .bind(&job.cups_job_id)
        .bind(job.status.as_str())
        .bind(job.submitted_at)
        .bind(job.completed_at)
        .bind(&job.error_message)
        .bind(job.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        ensure_affected(result, "Print job", job.id)
    }

    async fn update_status(&self, id: PrintJobId, status: PrintJobStatus) -> Result<()> {
        let result = sqlx::query("UPDATE print_jobs SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        ensure_affected(result, "Print job", id)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PrintJobRow {
    id: i64,
    document_id: i64,
    cups_job_id: Option<String>,
    status: String,
    submitted_at: i64,
    completed_at: Option<i64>,
    error_message: Option<String>,
}

impl PrintJobRow {
    fn into_print_job(self) -> Result<PrintJob> {
        Ok(PrintJob {
            id: self.id,
            document_id: self.document_id,
            cups_job_id: self.cups_job_id,
            status: self.status.parse()?,
            submitted_at: self.submitted_at,
            completed_at: self.completed_at,
            error_message: self.error_message,
        })
    }
}
