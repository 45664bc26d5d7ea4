use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::db::entities::{snippet, snippet_tag, tag, user};
use crate::db::services::tag_service::{get_or_create_tags, get_tag_titles_by_snippet, replace_snippet_tags};
use crate::web::models::snippet_models::{
    CreateSnippetRequest, DeleteSnippetsRequest, DeleteSnippetsResponse, SnippetDetail,
    SnippetOverview, SnippetSummary, UpdateSnippetRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum SnippetError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    /// Also returned for snippets owned by someone else.
    #[error("Snippet not found: {0}")]
    NotFound(i32),
    #[error("Tag not found: {0}")]
    TagNotFound(i32),
    #[error("{0}")]
    Validation(String),
}

const REQUIRED_FIELDS_MSG: &str = "title, note, and tags are required fields.";
const NO_FIELDS_MSG: &str = "At least one field (title, note, or tags) must be provided.";
const NO_IDS_MSG: &str = "No snippet IDs provided.";

/// Validated input for a new snippet.
#[derive(Debug, PartialEq)]
struct NewSnippet {
    title: String,
    note: String,
    tags: Vec<String>,
}

/// Validated input for an update. `None` leaves the stored value alone.
#[derive(Debug, PartialEq)]
struct SnippetChanges {
    title: Option<String>,
    note: Option<String>,
    tags: Option<Vec<String>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn check_title(title: &str) -> Result<(), SnippetError> {
    if title.chars().count() > snippet::TITLE_MAX_LEN {
        return Err(SnippetError::Validation(format!(
            "title must be at most {} characters.",
            snippet::TITLE_MAX_LEN
        )));
    }
    Ok(())
}

fn check_tag_titles(titles: &[String]) -> Result<(), SnippetError> {
    for title in titles {
        if title.is_empty() {
            return Err(SnippetError::Validation("tag titles must not be empty.".to_string()));
        }
        if title.chars().count() > tag::TITLE_MAX_LEN {
            return Err(SnippetError::Validation(format!(
                "tag titles must be at most {} characters.",
                tag::TITLE_MAX_LEN
            )));
        }
    }
    Ok(())
}

impl TryFrom<CreateSnippetRequest> for NewSnippet {
    type Error = SnippetError;

    fn try_from(payload: CreateSnippetRequest) -> Result<Self, Self::Error> {
        let title = non_empty(payload.title);
        let note = non_empty(payload.note);
        let tags = payload.tags.filter(|t| !t.is_empty());

        let (Some(title), Some(note), Some(tags)) = (title, note, tags) else {
            return Err(SnippetError::Validation(REQUIRED_FIELDS_MSG.to_string()));
        };
        check_title(&title)?;
        check_tag_titles(&tags)?;
        Ok(NewSnippet { title, note, tags })
    }
}

impl TryFrom<UpdateSnippetRequest> for SnippetChanges {
    type Error = SnippetError;

    // An empty title or note counts as not provided, while a present tag list
    // counts even when empty (it clears the tags).
    fn try_from(payload: UpdateSnippetRequest) -> Result<Self, Self::Error> {
        let changes = SnippetChanges {
            title: non_empty(payload.title),
            note: non_empty(payload.note),
            tags: payload.tags,
        };
        if changes.title.is_none() && changes.note.is_none() && changes.tags.is_none() {
            return Err(SnippetError::Validation(NO_FIELDS_MSG.to_string()));
        }
        if let Some(title) = &changes.title {
            check_title(title)?;
        }
        if let Some(tags) = &changes.tags {
            check_tag_titles(tags)?;
        }
        Ok(changes)
    }
}

// --- Snippet Service Functions ---

/// Finds a snippet by id, but only when `user_id` owns it.
pub async fn find_owned_snippet<C>(
    db: &C,
    snippet_id: i32,
    user_id: i32,
) -> Result<Option<snippet::Model>, DbErr>
where
    C: ConnectionTrait,
{
    snippet::Entity::find_by_id(snippet_id)
        .filter(snippet::Column::CreatedBy.eq(user_id))
        .one(db)
        .await
}

/// Builds the abbreviated projection for each snippet, keeping input order.
pub async fn summarize_snippets<C>(
    db: &C,
    snippets: Vec<snippet::Model>,
) -> Result<Vec<SnippetSummary>, DbErr>
where
    C: ConnectionTrait,
{
    let ids: Vec<i32> = snippets.iter().map(|s| s.id).collect();
    let mut titles = get_tag_titles_by_snippet(db, &ids).await?;

    Ok(snippets
        .into_iter()
        .map(|s| SnippetSummary {
            tags: titles.remove(&s.id).unwrap_or_default(),
            id: s.id,
            title: s.title,
        })
        .collect())
}

/// Builds the full projection, resolving tag titles and the owner's username.
pub async fn to_snippet_detail<C>(db: &C, snippet: snippet::Model) -> Result<SnippetDetail, DbErr>
where
    C: ConnectionTrait,
{
    let owner = user::Entity::find_by_id(snippet.created_by)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("owner of snippet {}", snippet.id)))?;
    let tags = get_tag_titles_by_snippet(db, &[snippet.id])
        .await?
        .remove(&snippet.id)
        .unwrap_or_default();

    Ok(SnippetDetail {
        id: snippet.id,
        title: snippet.title,
        note: snippet.note,
        tags,
        created_by: owner.username,
        created_at: snippet.created_at,
        updated_at: snippet.updated_at,
    })
}

/// All of the user's snippets in abbreviated form.
pub async fn get_snippet_overview<C>(db: &C, user_id: i32) -> Result<SnippetOverview, DbErr>
where
    C: ConnectionTrait,
{
    let snippets = snippet::Entity::find()
        .filter(snippet::Column::CreatedBy.eq(user_id))
        .order_by_asc(snippet::Column::Id)
        .all(db)
        .await?;
    let snippets = summarize_snippets(db, snippets).await?;

    Ok(SnippetOverview {
        total_snippets: snippets.len(),
        snippets,
    })
}

pub async fn get_snippet_detail<C>(
    db: &C,
    snippet_id: i32,
    user_id: i32,
) -> Result<SnippetDetail, SnippetError>
where
    C: ConnectionTrait,
{
    let snippet = find_owned_snippet(db, snippet_id, user_id)
        .await?
        .ok_or(SnippetError::NotFound(snippet_id))?;
    Ok(to_snippet_detail(db, snippet).await?)
}

/// Creates a snippet owned by `user_id` together with its tags, in one
/// transaction.
pub async fn create_snippet(
    db: &DatabaseConnection,
    user_id: i32,
    payload: CreateSnippetRequest,
) -> Result<SnippetDetail, SnippetError> {
    let input = NewSnippet::try_from(payload)?;
    let now = Utc::now();

    let txn = db.begin().await?;

    let new_snippet = snippet::ActiveModel {
        title: Set(input.title),
        note: Set(input.note),
        created_at: Set(now),
        updated_at: Set(now),
        created_by: Set(user_id),
        ..Default::default()
    };
    let saved = new_snippet.insert(&txn).await?;

    let tags = get_or_create_tags(&txn, &input.tags).await?;
    let tag_ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
    replace_snippet_tags(&txn, saved.id, &tag_ids).await?;

    let detail = to_snippet_detail(&txn, saved).await?;
    txn.commit().await?;

    info!(snippet_id = detail.id, user_id, tag_count = tag_ids.len(), "Snippet created.");
    Ok(detail)
}

/// Applies a partial update to one of the user's snippets, in one transaction.
pub async fn update_snippet(
    db: &DatabaseConnection,
    snippet_id: i32,
    user_id: i32,
    payload: UpdateSnippetRequest,
) -> Result<SnippetDetail, SnippetError> {
    let txn = db.begin().await?;

    // Ownership is checked before the payload so a foreign id is always 404.
    let snippet = find_owned_snippet(&txn, snippet_id, user_id)
        .await?
        .ok_or(SnippetError::NotFound(snippet_id))?;
    let changes = SnippetChanges::try_from(payload)?;

    let mut active_snippet = snippet.into_active_model();
    if let Some(title) = changes.title {
        active_snippet.title = Set(title);
    }
    if let Some(note) = changes.note {
        active_snippet.note = Set(note);
    }
    active_snippet.updated_at = Set(Utc::now());
    let updated = active_snippet.update(&txn).await?;

    if let Some(titles) = changes.tags {
        let tags = get_or_create_tags(&txn, &titles).await?;
        let tag_ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
        replace_snippet_tags(&txn, snippet_id, &tag_ids).await?;
        debug!(snippet_id, tag_count = tag_ids.len(), "Snippet tags replaced.");
    }

    let detail = to_snippet_detail(&txn, updated).await?;
    txn.commit().await?;

    info!(snippet_id, user_id, "Snippet updated.");
    Ok(detail)
}

/// Deletes the subset of `snippet_ids` owned by the user and returns the
/// refreshed overview. Ids that are missing or foreign are skipped.
pub async fn delete_snippets(
    db: &DatabaseConnection,
    user_id: i32,
    payload: DeleteSnippetsRequest,
) -> Result<DeleteSnippetsResponse, SnippetError> {
    let requested = payload.snippet_ids.unwrap_or_default();
    if requested.is_empty() {
        return Err(SnippetError::Validation(NO_IDS_MSG.to_string()));
    }

    let txn = db.begin().await?;

    let owned_ids: Vec<i32> = snippet::Entity::find()
        .select_only()
        .column(snippet::Column::Id)
        .filter(snippet::Column::Id.is_in(requested.iter().copied()))
        .filter(snippet::Column::CreatedBy.eq(user_id))
        .into_tuple()
        .all(&txn)
        .await?;

    let mut deleted_count = 0;
    if !owned_ids.is_empty() {
        snippet_tag::Entity::delete_many()
            .filter(snippet_tag::Column::SnippetId.is_in(owned_ids.iter().copied()))
            .exec(&txn)
            .await?;
        deleted_count = snippet::Entity::delete_many()
            .filter(snippet::Column::Id.is_in(owned_ids.iter().copied()))
            .filter(snippet::Column::CreatedBy.eq(user_id))
            .exec(&txn)
            .await?
            .rows_affected;
    }

    let overview = get_snippet_overview(&txn, user_id).await?;
    txn.commit().await?;

    info!(
        user_id,
        requested = requested.len(),
        deleted = deleted_count,
        "Bulk snippet delete finished."
    );
    Ok(DeleteSnippetsResponse {
        deleted_count,
        overview,
    })
}
