use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::errors::ServiceError;
use models::favorite;

/// Relation store for (user, listing) bookmarks. Uniqueness on the pair is
/// the store's invariant; both add and remove are idempotent.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Duplicate adds are absorbed silently.
    async fn add(&self, user_id: Uuid, listing_id: Uuid) -> Result<(), ServiceError>;
    /// Returns whether a row existed; removing nothing is still a success.
    async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> Result<bool, ServiceError>;
    /// Most recently favorited first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<favorite::Model>, ServiceError>;
    /// Cascade target for listing deletion; returns rows removed.
    async fn remove_for_listing(&self, listing_id: Uuid) -> Result<u64, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmFavoriteRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl FavoriteRepository for SeaOrmFavoriteRepository {
    async fn add(&self, user_id: Uuid, listing_id: Uuid) -> Result<(), ServiceError> {
        let am = favorite::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            listing_id: Set(listing_id),
            created_at: Set(chrono::Utc::now().into()),
        };
        // The unique (user_id, listing_id) index turns concurrent duplicate
        // adds into no-ops; exec_without_returning tolerates zero rows.
        favorite::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([favorite::Column::UserId, favorite::Column::ListingId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> Result<bool, ServiceError> {
        let res = favorite::Entity::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::ListingId.eq(listing_id))
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.rows_affected > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<favorite::Model>, ServiceError> {
        favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn remove_for_listing(&self, listing_id: Uuid) -> Result<u64, ServiceError> {
        let res = favorite::Entity::delete_many()
            .filter(favorite::Column::ListingId.eq(listing_id))
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.rows_affected)
    }
}

/// In-memory store keyed by the unique pair; the entry API makes duplicate
/// adds atomic.
pub mod mock {
    use super::*;
    use dashmap::DashMap;

    #[derive(Default)]
    pub struct MemoryFavoriteRepository {
        rows: DashMap<(Uuid, Uuid), favorite::Model>,
    }

    #[async_trait]
    impl FavoriteRepository for MemoryFavoriteRepository {
        async fn add(&self, user_id: Uuid, listing_id: Uuid) -> Result<(), ServiceError> {
            self.rows.entry((user_id, listing_id)).or_insert_with(|| favorite::Model {
                id: Uuid::new_v4(),
                user_id,
                listing_id,
                created_at: chrono::Utc::now().into(),
            });
            Ok(())
        }

        async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.rows.remove(&(user_id, listing_id)).is_some())
        }

        async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<favorite::Model>, ServiceError> {
            let mut rows: Vec<favorite::Model> = self
                .rows
                .iter()
                .filter(|entry| entry.key().0 == user_id)
                .map(|entry| entry.value().clone())
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }

        async fn remove_for_listing(&self, listing_id: Uuid) -> Result<u64, ServiceError> {
            let before = self.rows.len();
            self.rows.retain(|key, _| key.1 != listing_id);
            Ok((before - self.rows.len()) as u64)
        }
    }
}
