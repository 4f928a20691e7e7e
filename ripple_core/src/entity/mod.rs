// SeaORM entities
// One module per table; the schema itself lives in `models::migrator`.

pub mod comment;
pub mod follow;
pub mod good;
pub mod post;
pub mod post_child;
pub mod profile;
pub mod user;


pub mod prelude {
    // Re-export all entities for convenience
    pub use super::comment::{
        ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as Comment,
        Model as CommentModel,
    };
    pub use super::follow::{
        ActiveModel as FollowActiveModel, Column as FollowColumn, Entity as Follow,
        Model as FollowModel,
    };
    pub use super::good::{
        ActiveModel as GoodActiveModel, Column as GoodColumn, Entity as Good, Model as GoodModel,
    };
    pub use super::post::{
        ActiveModel as PostActiveModel, Column as PostColumn, Entity as Post, Model as PostModel,
    };
    pub use super::post_child::{
        ActiveModel as PostChildActiveModel, Column as PostChildColumn, Entity as PostChild,
        Model as PostChildModel,
    };
    pub use super::profile::{
        ActiveModel as ProfileActiveModel, Column as ProfileColumn, Entity as Profile,
        Model as ProfileModel,
    };
    pub use super::user::{
        ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
    };

    // Re-export commonly used SeaORM types and traits
    pub use sea_orm::prelude::DateTimeUtc;
    pub use sea_orm::{
        ActiveModelTrait,
        ActiveValue,

        ColumnTrait,
        ConnectionTrait,

        // Database and connection types
        Database,
        DatabaseConnection,
        DbConn,
        // Common result types
        DbErr,
        Delete,

        // Core traits
        EntityTrait,
        Insert,
        ModelTrait,
        NotSet,
        // Pagination
        PaginatorTrait,
        QueryFilter,
        QueryOrder,
        QuerySelect,
        Related,
        RelationTrait,
        // Query builders
        Select,
        // Active model helpers
        Set,
        TransactionTrait,

        Unchanged,
        Update,
    };
}
