//! Create `favorite` relation table.
//!
//! `listing_id` is deliberately not a foreign key: the favorites store holds
//! a non-owning reference and cleanup after listing deletion is performed by
//! the service layer (eventually consistent).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Favorite::Table)
                    .if_not_exists()
                    .col(uuid(Favorite::Id).primary_key())
                    .col(uuid(Favorite::UserId).not_null())
                    .col(uuid(Favorite::ListingId).not_null())
                    .col(timestamp_with_time_zone(Favorite::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_user")
                            .from(Favorite::Table, Favorite::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Favorite::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Favorite { Table, Id, UserId, ListingId, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
