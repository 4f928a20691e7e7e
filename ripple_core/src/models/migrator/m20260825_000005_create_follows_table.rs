use sea_orm_migration::{prelude::*, schema::*};

use super::m20260825_000001_create_users_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    // The composite primary key doubles as the duplicate-edge guard and as
    // the follower_id -> followed_id lookup index.
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .col(big_integer(Follow::FollowerId))
                    .col(big_integer(Follow::FollowedId))
                    .index(
                        Index::create()
                            .primary()
                            .col(Follow::FollowerId)
                            .col(Follow::FollowedId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-follow-follower_id")
                            .from(Follow::Table, Follow::FollowerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-follow-followed_id")
                            .from(Follow::Table, Follow::FollowedId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Reverse-direction lookups (followers of a user)
        manager
            .create_index(
                Index::create()
                    .name("idx_follows_followed_id")
                    .table(Follow::Table)
                    .col(Follow::FollowedId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follow::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Follow {
    Table,
    FollowerId,
    FollowedId,
}
