use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snippet_models::TagSummary;

#[derive(Debug, Default, Deserialize)]
pub struct AdminSnippetQuery {
    /// Substring matched against title or note.
    pub search: Option<String>,
    /// Owner username.
    pub created_by: Option<String>,
    /// Tag title.
    pub tag: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminTagQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSnippetRow {
    pub id: i32,
    pub title: String,
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSnippetList {
    pub total_snippets: usize,
    pub snippets: Vec<AdminSnippetRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminTagList {
    pub total_tags: usize,
    pub tags: Vec<TagSummary>,
}
