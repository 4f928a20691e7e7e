use sea_orm_migration::{prelude::*, schema::*};

use super::m20260825_000003_create_posts_table::Post;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostChild::Table)
                    .col(
                        ColumnDef::new(PostChild::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer(PostChild::PostId))
                    .col(text(PostChild::Content))
                    .col(string_null(PostChild::MediaRef))
                    .col(string_null(PostChild::Location))
                    .col(string_null(PostChild::Category))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_child-post_id")
                            .from(PostChild::Table, PostChild::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on post_id
        manager
            .create_index(
                Index::create()
                    .name("idx_post_children_post_id")
                    .table(PostChild::Table)
                    .col(PostChild::PostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostChild::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PostChild {
    Table,
    Id,
    PostId,
    Content,
    MediaRef,
    Location,
    Category,
}
