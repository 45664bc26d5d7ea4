use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Requests ---

/// Body of `POST /create/`. Every field is optional at the wire level so a
/// missing field is reported as a validation error rather than a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSnippetRequest {
    pub title: Option<String>,
    pub note: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body of `PUT /update/{id}/`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSnippetRequest {
    pub title: Option<String>,
    pub note: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteSnippetsRequest {
    pub snippet_ids: Option<Vec<i32>>,
}

// --- Projections ---

/// Abbreviated projection used by every listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetSummary {
    pub id: i32,
    pub title: String,
    pub tags: Vec<String>,
}

/// Full projection of a single snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetDetail {
    pub id: i32,
    pub title: String,
    pub note: String,
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetOverview {
    pub total_snippets: usize,
    pub snippets: Vec<SnippetSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteSnippetsResponse {
    pub deleted_count: u64,
    #[serde(flatten)]
    pub overview: SnippetOverview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSummary {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagListResponse {
    pub total_tags: usize,
    pub tags: Vec<TagSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDetailResponse {
    pub tag: String,
    /// Snippets carrying the tag across all owners.
    pub total_snippets: u64,
    /// Only the caller's snippets carrying the tag.
    pub snippets: Vec<SnippetSummary>,
}
