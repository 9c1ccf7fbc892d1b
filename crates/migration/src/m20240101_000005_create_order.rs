//! Create `orders` table (plural: `order` is a reserved word).
//!
//! Order placement lives outside this service; the table backs the
//! platform-stats order count.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(uuid(Orders::Id).primary_key())
                    .col(uuid(Orders::ListingId).not_null())
                    .col(uuid(Orders::BuyerId).not_null())
                    .col(string_len(Orders::Status, 32).not_null())
                    .col(ColumnDef::new(Orders::Amount).double().null())
                    .col(timestamp_with_time_zone(Orders::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Orders::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Orders { Table, Id, ListingId, BuyerId, Status, Amount, CreatedAt }
