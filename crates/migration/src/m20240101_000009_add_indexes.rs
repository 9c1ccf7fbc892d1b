use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listing: seller, status and recency lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_seller")
                    .table(Listing::Table)
                    .col(Listing::SellerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_status")
                    .table(Listing::Table)
                    .col(Listing::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_created")
                    .table(Listing::Table)
                    .col(Listing::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Favorite: the pair is unique; listing_id is scanned by the cascade
        manager
            .create_index(
                Index::create()
                    .name("uniq_favorite_user_listing")
                    .table(Favorite::Table)
                    .col(Favorite::UserId)
                    .col(Favorite::ListingId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_listing")
                    .table(Favorite::Table)
                    .col(Favorite::ListingId)
                    .to_owned(),
            )
            .await?;

        // Dispute: stats counts open rows
        manager
            .create_index(
                Index::create()
                    .name("idx_dispute_status")
                    .table(Dispute::Table)
                    .col(Dispute::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_listing_seller").table(Listing::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_listing_status").table(Listing::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_listing_created").table(Listing::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("uniq_favorite_user_listing")
                    .table(Favorite::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_favorite_listing").table(Favorite::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_dispute_status").table(Dispute::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Listing { Table, SellerId, Status, CreatedAt }

#[derive(DeriveIden)]
enum Favorite { Table, UserId, ListingId }

#[derive(DeriveIden)]
enum Dispute { Table, Status }
