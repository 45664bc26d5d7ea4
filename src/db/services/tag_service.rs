use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::entities::{snippet, snippet_tag, tag};
use crate::db::services::snippet_service::{summarize_snippets, SnippetError};
use crate::web::models::snippet_models::{TagDetailResponse, TagListResponse, TagSummary};

// --- Tag Service Functions ---

/// Returns the tag with `title`, creating it first if it does not exist.
///
/// The insert ignores unique-key conflicts, so two requests racing on the
/// same new title both end up with the single stored row.
pub async fn get_or_create_tag<C>(db: &C, title: &str) -> Result<tag::Model, DbErr>
where
    C: ConnectionTrait,
{
    if let Some(existing) = find_tag_by_title(db, title).await? {
        return Ok(existing);
    }

    let new_tag = tag::ActiveModel {
        title: Set(title.to_owned()),
        ..Default::default()
    };
    tag::Entity::insert(new_tag)
        .on_conflict(OnConflict::column(tag::Column::Title).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    find_tag_by_title(db, title)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("tag '{title}' vanished after insert")))
}

/// Resolves every title to a tag row, de-duplicated, in first-seen order.
pub async fn get_or_create_tags<C>(db: &C, titles: &[String]) -> Result<Vec<tag::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let mut seen = HashSet::new();
    let mut tags = Vec::with_capacity(titles.len());
    for title in titles {
        if !seen.insert(title.as_str()) {
            continue;
        }
        tags.push(get_or_create_tag(db, title).await?);
    }
    Ok(tags)
}

async fn find_tag_by_title<C>(db: &C, title: &str) -> Result<Option<tag::Model>, DbErr>
where
    C: ConnectionTrait,
{
    tag::Entity::find()
        .filter(tag::Column::Title.eq(title))
        .one(db)
        .await
}

/// Replaces the snippet's tag associations with exactly `tag_ids`.
pub async fn replace_snippet_tags<C>(db: &C, snippet_id: i32, tag_ids: &[i32]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    snippet_tag::Entity::delete_many()
        .filter(snippet_tag::Column::SnippetId.eq(snippet_id))
        .exec(db)
        .await?;

    if !tag_ids.is_empty() {
        let links = tag_ids.iter().map(|&tag_id| snippet_tag::ActiveModel {
            snippet_id: Set(snippet_id),
            tag_id: Set(tag_id),
        });
        snippet_tag::Entity::insert_many(links)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

/// Tag titles per snippet id, each list sorted alphabetically. Snippets
/// without tags are absent from the map.
pub async fn get_tag_titles_by_snippet<C>(
    db: &C,
    snippet_ids: &[i32],
) -> Result<HashMap<i32, Vec<String>>, DbErr>
where
    C: ConnectionTrait,
{
    if snippet_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = snippet_tag::Entity::find()
        .filter(snippet_tag::Column::SnippetId.is_in(snippet_ids.iter().copied()))
        .find_also_related(tag::Entity)
        .all(db)
        .await?;

    let mut titles: HashMap<i32, Vec<String>> = HashMap::new();
    for (link, tag) in rows {
        if let Some(tag) = tag {
            titles.entry(link.snippet_id).or_default().push(tag.title);
        }
    }
    for list in titles.values_mut() {
        list.sort();
    }
    Ok(titles)
}

/// Every tag in the store. Tags are global, so this is not owner-scoped.
pub async fn get_all_tags<C>(db: &C) -> Result<TagListResponse, DbErr>
where
    C: ConnectionTrait,
{
    let tags: Vec<TagSummary> = tag::Entity::find()
        .order_by_asc(tag::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|t| TagSummary { id: t.id, title: t.title })
        .collect();

    Ok(TagListResponse {
        total_tags: tags.len(),
        tags,
    })
}

/// Looks the tag up without owner scoping, then lists only the caller's
/// snippets carrying it. `total_snippets` counts the tag's snippets across
/// all owners.
pub async fn get_tag_detail<C>(
    db: &C,
    tag_id: i32,
    user_id: i32,
) -> Result<TagDetailResponse, SnippetError>
where
    C: ConnectionTrait,
{
    let tag = tag::Entity::find_by_id(tag_id)
        .one(db)
        .await?
        .ok_or(SnippetError::TagNotFound(tag_id))?;

    let total_snippets = snippet_tag::Entity::find()
        .filter(snippet_tag::Column::TagId.eq(tag_id))
        .count(db)
        .await?;

    let owned = snippet::Entity::find()
        .inner_join(snippet_tag::Entity)
        .filter(snippet_tag::Column::TagId.eq(tag_id))
        .filter(snippet::Column::CreatedBy.eq(user_id))
        .order_by_asc(snippet::Column::Id)
        .all(db)
        .await?;

    Ok(TagDetailResponse {
        tag: tag.title,
        total_snippets,
        snippets: summarize_snippets(db, owned).await?,
    })
}
