//! Create `listing` table with FK to `user` (seller).
//!
//! `price` is nullable alongside `price_legacy`: rows imported from the
//! previous platform generation carry only the legacy column. `seller_name`
//! is a denormalized display copy captured at creation time.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listing::Table)
                    .if_not_exists()
                    .col(uuid(Listing::Id).primary_key())
                    .col(string_len(Listing::Title, 255).not_null())
                    .col(text(Listing::Description).not_null())
                    .col(ColumnDef::new(Listing::Price).double().null())
                    .col(ColumnDef::new(Listing::PriceLegacy).double().null())
                    .col(string_len(Listing::Category, 32).not_null())
                    .col(ColumnDef::new(Listing::ImageUrl).string_len(512).null())
                    .col(uuid(Listing::SellerId).not_null())
                    .col(string_len(Listing::SellerName, 128).not_null())
                    .col(double(Listing::Rating).not_null())
                    .col(integer(Listing::ReviewCount).not_null())
                    .col(string_len(Listing::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Listing::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Listing::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_seller")
                            .from(Listing::Table, Listing::SellerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Listing::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Listing {
    Table,
    Id,
    Title,
    Description,
    Price,
    PriceLegacy,
    Category,
    ImageUrl,
    SellerId,
    SellerName,
    Rating,
    ReviewCount,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
