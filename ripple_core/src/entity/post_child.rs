use crate::ids::{PostChildId, PostId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One content segment of a post. Segments are written together with their
/// parent post and are immutable afterwards; they go away with the post.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post_child")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: PostChildId,
    pub post_id: PostId,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub media_ref: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
