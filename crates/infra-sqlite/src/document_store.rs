// SQLite DocumentStore Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use blackoutbox_core::domain::{Document, DocumentId};
use blackoutbox_core::error::Result;
use blackoutbox_core::port::DocumentStore;
use sqlx::SqlitePool;

const SELECT_DOCUMENT: &str = r#"
    SELECT id, system_id, file_reference, file_path, print_at, last_printed_at, tags, updated_at
    FROM documents
"#;

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert(&self, document: &Document) -> Result<DocumentId> {
        // Tags are stored as a JSON array
        let tags = serde_json::to_string(&document.tags)?;

        let result = sqlx::query(
            r#"
            INSERT INTO documents (
                system_id, file_reference, file_path, print_at, last_printed_at, tags, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&document.system_id)
        .bind(&document.file_reference)
        .bind(&document.file_path)
        .bind(document.print_at)
        .bind(document.last_printed_at)
        .bind(tags)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!("{SELECT_DOCUMENT} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    async fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!("{SELECT_DOCUMENT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(DocumentRow::into_document).transpose()
    }

    async fn find_by_system_id(&self, system_id: &str) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "{SELECT_DOCUMENT} WHERE system_id = ? ORDER BY id"
        ))
        .bind(system_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    system_id: String,
    file_reference: String,
    file_path: String,
    print_at: Option<i64>,
    last_printed_at: Option<i64>,
    tags: String,
    updated_at: Option<i64>,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document> {
        let tags: Vec<String> = serde_json::from_str(&self.tags)?;
        Ok(Document {
            id: self.id,
            system_id: self.system_id,
            file_reference: self.file_reference,
            file_path: self.file_path,
            print_at: self.print_at,
            last_printed_at: self.last_printed_at,
            tags,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn setup_test_db() -> SqliteDocumentStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteDocumentStore::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_find_with_tags() {
        let store = setup_test_db().await;
        let mut document =
            Document::new(0, "sys-a", "will", "/docs/will.pdf").with_tags(["legal", "family"]);
        document.print_at = Some(500);

        let id = store.insert(&document).await.unwrap();
        let found = store.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(found, Document { id, ..document });
        assert_eq!(found.tags, vec!["legal".to_string(), "family".to_string()]);
    }

    #[tokio::test]
    async fn test_find_by_system_id_keeps_insertion_order() {
        let store = setup_test_db().await;
        let a = store
            .insert(&Document::new(0, "sys-a", "one", "/a/1.pdf"))
            .await
            .unwrap();
        store
            .insert(&Document::new(0, "sys-b", "two", "/b/2.pdf"))
            .await
            .unwrap();
        let c = store
            .insert(&Document::new(0, "sys-a", "three", "/a/3.pdf"))
            .await
            .unwrap();

        let ids: Vec<_> = store
            .find_by_system_id("sys-a")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![a, c]);
        assert!(store.find_by_system_id("sys-z").await.unwrap().is_empty());
        assert_eq!(store.list().await.unwrap().len(), 3);
    }
}
