use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum length of a snippet title, in characters.
pub const TITLE_MAX_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "snippets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub note: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
    pub created_by: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade", // A user's snippets go with the user
        on_update = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::snippet_tag::Entity")]
    SnippetTags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::snippet_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SnippetTags.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::snippet_tag::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::snippet_tag::Relation::Snippet.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
