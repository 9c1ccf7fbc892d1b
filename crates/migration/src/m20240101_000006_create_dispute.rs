//! Create `dispute` table; open disputes feed the admin stats view.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dispute::Table)
                    .if_not_exists()
                    .col(uuid(Dispute::Id).primary_key())
                    .col(uuid(Dispute::OrderId).not_null())
                    .col(string_len(Dispute::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Dispute::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Dispute::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Dispute { Table, Id, OrderId, Status, CreatedAt }
