use crate::ids::{PostId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    /// Doubles as the insertion sequence number: assigned in increasing
    /// order, used to break creation-timestamp ties in the feed.
    #[sea_orm(primary_key)]
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::post_child::Entity")]
    PostChild,
    #[sea_orm(has_many = "super::good::Entity")]
    Good,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::post_child::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostChild.def()
    }
}

impl Related<super::good::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Good.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
