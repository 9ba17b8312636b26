// Document & Template Domain Models

use serde::{Deserialize, Serialize};

/// Document ID (SQLite rowid)
pub type DocumentId = i64;

/// Template ID (SQLite rowid)
pub type TemplateId = i64;

/// A file owned by one system, printed when that system's trigger escalates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub system_id: String,
    /// Caller-chosen reference shared with templates
    pub file_reference: String,
    pub file_path: String,
    pub print_at: Option<i64>,
    pub last_printed_at: Option<i64>,
    /// Ordered, duplicate-free
    pub tags: Vec<String>,
    pub updated_at: Option<i64>,
}

impl Document {
    pub fn new(
        id: DocumentId,
        system_id: impl Into<String>,
        file_reference: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            id,
            system_id: system_id.into(),
            file_reference: file_reference.into(),
            file_path: file_path.into(),
            print_at: None,
            last_printed_at: None,
            tags: Vec::new(),
            updated_at: None,
        }
    }

    /// Attach tags, keeping first-seen order and dropping duplicates and blanks
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            let tag = tag.trim();
            if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
                self.tags.push(tag.to_string());
            }
        }
        self
    }
}

/// System-provided default file, looked up by file reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub system_id: String,
    pub file_reference: String,
    pub file_path: String,
    pub description: String,
    pub created_at: i64,
}

impl Template {
    pub fn new(
        id: TemplateId,
        system_id: impl Into<String>,
        file_reference: impl Into<String>,
        file_path: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            system_id: system_id.into(),
            file_reference: file_reference.into(),
            file_path: file_path.into(),
            description: String::new(),
            created_at,
        }
    }
}
