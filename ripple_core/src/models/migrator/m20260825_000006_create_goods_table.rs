use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20260825_000006_create_goods_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Good::Table)
                    .col(
                        ColumnDef::new(Good::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Good::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Good::PostId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_good_user_id")
                            .from(Good::Table, Good::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_good_post_id")
                            .from(Good::Table, Good::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create unique index on (user_id, post_id): one good per user per
        // post, enforced by storage rather than application pre-checks.
        manager
            .create_index(
                Index::create()
                    .name("idx_goods_user_post_unique")
                    .table(Good::Table)
                    .col(Good::UserId)
                    .col(Good::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create index on user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_goods_user_id")
                    .table(Good::Table)
                    .col(Good::UserId)
                    .to_owned(),
            )
            .await?;

        // Create index on post_id
        manager
            .create_index(
                Index::create()
                    .name("idx_goods_post_id")
                    .table(Good::Table)
                    .col(Good::PostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Good::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Good {
    Table,
    Id,
    UserId,
    PostId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}
