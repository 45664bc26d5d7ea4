use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum length of a tag title, in characters.
pub const TITLE_MAX_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    // Tags are global, so the title is unique across all users.
    #[sea_orm(unique, column_type = "String(StringLen::N(100))")]
    pub title: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::snippet_tag::Entity")]
    SnippetTags,
}

impl Related<super::snippet_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SnippetTags.def()
    }
}

impl Related<super::snippet::Entity> for Entity {
    fn to() -> RelationDef {
        super::snippet_tag::Relation::Snippet.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::snippet_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
