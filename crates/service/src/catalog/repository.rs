use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use models::listing::{self, ListingCategory, ListingStatus, NewListing};

/// Search over listings: case-insensitive substring on title or seller name,
/// optional exact status, optional category. When no status is requested,
/// `sold` rows are excluded unless `include_sold` is set.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub text: Option<String>,
    pub status: Option<ListingStatus>,
    pub category: Option<ListingCategory>,
    pub include_sold: bool,
}

impl SearchFilter {
    /// Matching rule used by the in-memory store; the SQL path mirrors it.
    pub fn matches(&self, row: &listing::Model) -> bool {
        if let Some(status) = self.status {
            if row.status != status {
                return false;
            }
        } else if !self.include_sold && row.status == ListingStatus::Sold {
            return false;
        }
        if let Some(category) = self.category {
            if row.category != category {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.trim().to_lowercase();
            if !needle.is_empty()
                && !row.title.to_lowercase().contains(&needle)
                && !row.seller_name.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn create(&self, input: NewListing) -> Result<listing::Model, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<listing::Model>, ServiceError>;
    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<listing::Model>, ServiceError>;
    /// Ordered by creation time descending.
    async fn search(&self, filter: &SearchFilter, page: Pagination) -> Result<Vec<listing::Model>, ServiceError>;
    /// Atomic status move: succeeds only while the row still carries
    /// `expect`. Returning `false` means the caller lost a race (or the row
    /// is gone) and must re-read before retrying.
    async fn compare_and_set_status(&self, id: Uuid, expect: ListingStatus, to: ListingStatus) -> Result<bool, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn count(&self) -> Result<u64, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmListingRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ListingRepository for SeaOrmListingRepository {
    async fn create(&self, input: NewListing) -> Result<listing::Model, ServiceError> {
        listing::create(&self.db, input).await.map_err(Into::into)
    }

    async fn get(&self, id: Uuid) -> Result<Option<listing::Model>, ServiceError> {
        listing::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<listing::Model>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        listing::Entity::find()
            .filter(listing::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn search(&self, filter: &SearchFilter, page: Pagination) -> Result<Vec<listing::Model>, ServiceError> {
        let (offset, limit) = page.normalize();
        let mut query = listing::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(listing::Column::Status.eq(status));
        } else if !filter.include_sold {
            query = query.filter(listing::Column::Status.ne(ListingStatus::Sold));
        }
        if let Some(category) = filter.category {
            query = query.filter(listing::Column::Category.eq(category));
        }
        if let Some(text) = &filter.text {
            let needle = text.trim();
            if !needle.is_empty() {
                let pattern = format!("%{}%", needle);
                query = query.filter(
                    Condition::any()
                        .add(Expr::col((listing::Entity, listing::Column::Title)).ilike(pattern.clone()))
                        .add(Expr::col((listing::Entity, listing::Column::SellerName)).ilike(pattern)),
                );
            }
        }
        query
            .order_by_desc(listing::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn compare_and_set_status(&self, id: Uuid, expect: ListingStatus, to: ListingStatus) -> Result<bool, ServiceError> {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        let res = listing::Entity::update_many()
            .col_expr(listing::Column::Status, Expr::value(to))
            .col_expr(listing::Column::UpdatedAt, Expr::value(now))
            .filter(listing::Column::Id.eq(id))
            .filter(listing::Column::Status.eq(expect))
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.rows_affected == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = listing::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.rows_affected > 0)
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        listing::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }
}

/// In-memory store for tests and doc examples. `DashMap` gives per-record
/// atomicity: the compare-and-set below holds the entry lock for the whole
/// check-then-write.
pub mod mock {
    use super::*;
    use dashmap::DashMap;

    #[derive(Default)]
    pub struct MemoryListingRepository {
        rows: DashMap<Uuid, listing::Model>,
    }

    impl MemoryListingRepository {
        /// Insert a pre-built row, bypassing creation defaults. Lets tests
        /// stage legacy-priced or already-sold records.
        pub fn seed(&self, row: listing::Model) {
            self.rows.insert(row.id, row);
        }
    }

    #[async_trait]
    impl ListingRepository for MemoryListingRepository {
        async fn create(&self, input: NewListing) -> Result<listing::Model, ServiceError> {
            let row = listing::build(input);
            self.rows.insert(row.id, row.clone());
            Ok(row)
        }

        async fn get(&self, id: Uuid) -> Result<Option<listing::Model>, ServiceError> {
            Ok(self.rows.get(&id).map(|r| r.value().clone()))
        }

        async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<listing::Model>, ServiceError> {
            Ok(ids.iter().filter_map(|id| self.rows.get(id).map(|r| r.value().clone())).collect())
        }

        async fn search(&self, filter: &SearchFilter, page: Pagination) -> Result<Vec<listing::Model>, ServiceError> {
            let (offset, limit) = page.normalize();
            let mut rows: Vec<listing::Model> = self
                .rows
                .iter()
                .filter(|r| filter.matches(r.value()))
                .map(|r| r.value().clone())
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows.into_iter().skip(offset as usize).take(limit as usize).collect())
        }

        async fn compare_and_set_status(&self, id: Uuid, expect: ListingStatus, to: ListingStatus) -> Result<bool, ServiceError> {
            match self.rows.get_mut(&id) {
                Some(mut row) if row.status == expect => {
                    row.status = to;
                    row.updated_at = chrono::Utc::now().into();
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.rows.remove(&id).is_some())
        }

        async fn count(&self) -> Result<u64, ServiceError> {
            Ok(self.rows.len() as u64)
        }
    }
}
