//! Read-only listings backing the admin endpoints. Unlike the rest of the
//! query layer these are not owner-scoped.

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::db::entities::{snippet, snippet_tag, tag, user};
use crate::db::services::tag_service::get_tag_titles_by_snippet;
use crate::web::models::admin_models::{
    AdminSnippetList, AdminSnippetQuery, AdminSnippetRow, AdminTagList, AdminTagQuery,
};
use crate::web::models::snippet_models::TagSummary;

pub async fn admin_list_snippets<C>(
    db: &C,
    query: &AdminSnippetQuery,
) -> Result<AdminSnippetList, DbErr>
where
    C: ConnectionTrait,
{
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(snippet::Column::Title.contains(search))
                .add(snippet::Column::Note.contains(search)),
        );
    }
    if let Some(username) = query.created_by.as_deref() {
        condition = condition.add(user::Column::Username.eq(username));
    }
    if let Some(tag_title) = query.tag.as_deref() {
        let tagged_ids: Vec<i32> = snippet_tag::Entity::find()
            .select_only()
            .column(snippet_tag::Column::SnippetId)
            .inner_join(tag::Entity)
            .filter(tag::Column::Title.eq(tag_title))
            .into_tuple()
            .all(db)
            .await?;
        if tagged_ids.is_empty() {
            return Ok(AdminSnippetList {
                total_snippets: 0,
                snippets: Vec::new(),
            });
        }
        condition = condition.add(snippet::Column::Id.is_in(tagged_ids));
    }
    if let Some(after) = query.created_after {
        condition = condition.add(snippet::Column::CreatedAt.gte(after));
    }
    if let Some(before) = query.created_before {
        condition = condition.add(snippet::Column::CreatedAt.lte(before));
    }
    if let Some(after) = query.updated_after {
        condition = condition.add(snippet::Column::UpdatedAt.gte(after));
    }
    if let Some(before) = query.updated_before {
        condition = condition.add(snippet::Column::UpdatedAt.lte(before));
    }

    let rows = snippet::Entity::find()
        .find_also_related(user::Entity)
        .filter(condition)
        .order_by_asc(snippet::Column::Id)
        .all(db)
        .await?;

    let ids: Vec<i32> = rows.iter().map(|(s, _)| s.id).collect();
    let mut titles = get_tag_titles_by_snippet(db, &ids).await?;

    let snippets: Vec<AdminSnippetRow> = rows
        .into_iter()
        .map(|(s, owner)| AdminSnippetRow {
            tags: titles.remove(&s.id).unwrap_or_default(),
            created_by: owner.map(|u| u.username).unwrap_or_default(),
            id: s.id,
            title: s.title,
            created_at: s.created_at,
            updated_at: s.updated_at,
        })
        .collect();

    Ok(AdminSnippetList {
        total_snippets: snippets.len(),
        snippets,
    })
}

pub async fn admin_list_tags<C>(db: &C, query: &AdminTagQuery) -> Result<AdminTagList, DbErr>
where
    C: ConnectionTrait,
{
    let mut select = tag::Entity::find();
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(tag::Column::Title.contains(search));
    }

    let tags: Vec<TagSummary> = select
        .order_by_asc(tag::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|t| TagSummary { id: t.id, title: t.title })
        .collect();

    Ok(AdminTagList {
        total_tags: tags.len(),
        tags,
    })
}
