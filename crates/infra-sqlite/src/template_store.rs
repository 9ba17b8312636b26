// SQLite TemplateStore Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use blackoutbox_core::domain::{Template, TemplateId};
use blackoutbox_core::error::Result;
use blackoutbox_core::port::TemplateStore;
use sqlx::SqlitePool;

const SELECT_TEMPLATE: &str = r#"
    SELECT id, system_id, file_reference, file_path, description, created_at
    FROM templates
"#;

pub struct SqliteTemplateStore {
    pool: SqlitePool,
}

impl SqliteTemplateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for SqliteTemplateStore {
    async fn insert(&self, template: &Template) -> Result<TemplateId> {
        let result = sqlx::query(
            r#"
            INSERT INTO templates (system_id, file_reference, file_path, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&template.system_id)
        .bind(&template.file_reference)
        .bind(&template.file_path)
        .bind(&template.description)
        .bind(template.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn list(&self) -> Result<Vec<Template>> {
        let rows = sqlx::query_as::<_, TemplateRow>(&format!("{SELECT_TEMPLATE} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Template::from).collect())
    }

    async fn find_by_id(&self, id: TemplateId) -> Result<Option<Template>> {
        let row = sqlx::query_as::<_, TemplateRow>(&format!("{SELECT_TEMPLATE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Template::from))
    }

    async fn find_by_file_reference(&self, file_reference: &str) -> Result<Option<Template>> {
        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            "{SELECT_TEMPLATE} WHERE file_reference = ? ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .bind(file_reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Template::from))
    }

    async fn find_by_system_id(&self, system_id: &str) -> Result<Vec<Template>> {
        let rows = sqlx::query_as::<_, TemplateRow>(&format!(
            "{SELECT_TEMPLATE} WHERE system_id = ? ORDER BY id"
        ))
        .bind(system_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Template::from).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TemplateRow {
    id: i64,
    system_id: String,
    file_reference: String,
    file_path: String,
    description: String,
    created_at: i64,
}

impl From<TemplateRow> for Template {
    fn from(row: TemplateRow) -> Self {
        Template {
            id: row.id,
            system_id: row.system_id,
            file_reference: row.file_reference,
            file_path: row.file_path,
            description: row.description,
            created_at: row.created_at,
        }
    }
}
