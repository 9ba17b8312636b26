// Blackoutbox Infrastructure - SQLite Adapter
// Implements: TriggerStore, DocumentStore, TemplateStore, PrintJobStore

mod connection;
mod document_store;
mod error;
mod migration;
mod print_job_store;
mod template_store;
mod trigger_store;

pub use connection::create_pool;
pub use document_store::SqliteDocumentStore;
pub use migration::run_migrations;
pub use print_job_store::SqlitePrintJobStore;
pub use template_store::SqliteTemplateStore;
pub use trigger_store::SqliteTriggerStore;

use blackoutbox_core::application::Stores;
use sqlx::SqlitePool;
use std::sync::Arc;

/// All four stores over one pool
pub fn sqlite_stores(pool: SqlitePool) -> Stores {
    Stores {
        triggers: Arc::new(SqliteTriggerStore::new(pool.clone())),
        documents: Arc::new(SqliteDocumentStore::new(pool.clone())),
        templates: Arc::new(SqliteTemplateStore::new(pool.clone())),
        print_jobs: Arc::new(SqlitePrintJobStore::new(pool)),
    }
}

// Note: sqlx::Error conversion is handled by map_sqlx_error in error.rs
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
