use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::catalog::repository::ListingRepository;
use crate::errors::ServiceError;
use crate::session::{self, Principal};
use models::listing;

use super::repository::FavoriteRepository;

/// Buyer-facing favorites. Every operation checks that the caller manages
/// their own records; the join against the listing store filters favorites
/// whose listing has been deleted (the cascade may lag behind).
pub struct FavoritesService {
    favorites: Arc<dyn FavoriteRepository>,
    listings: Arc<dyn ListingRepository>,
}

impl FavoritesService {
    pub fn new(favorites: Arc<dyn FavoriteRepository>, listings: Arc<dyn ListingRepository>) -> Self {
        Self { favorites, listings }
    }

    /// Idempotent: favoriting twice leaves exactly one record.
    #[instrument(skip(self), fields(user_id = %user_id, listing_id = %listing_id))]
    pub async fn add(&self, principal: &Principal, user_id: Uuid, listing_id: Uuid) -> Result<(), ServiceError> {
        session::require_self(principal, user_id)?;
        if self.listings.get(listing_id).await?.is_none() {
            return Err(ServiceError::not_found("listing"));
        }
        self.favorites.add(user_id, listing_id).await
    }

    /// Idempotent: removing a favorite that does not exist is a success.
    #[instrument(skip(self), fields(user_id = %user_id, listing_id = %listing_id))]
    pub async fn remove(&self, principal: &Principal, user_id: Uuid, listing_id: Uuid) -> Result<(), ServiceError> {
        session::require_self(principal, user_id)?;
        let existed = self.favorites.remove(user_id, listing_id).await?;
        if !existed {
            debug!("favorite was already gone");
        }
        Ok(())
    }

    /// Favorited listings joined with current listing state, most recently
    /// favorited first. Orphans are dropped from the result, never surfaced.
    pub async fn list(&self, principal: &Principal, user_id: Uuid) -> Result<Vec<listing::Model>, ServiceError> {
        session::require_self(principal, user_id)?;
        let favorites = self.favorites.list_for_user(user_id).await?;
        let ids: Vec<Uuid> = favorites.iter().map(|f| f.listing_id).collect();
        let rows = self.listings.get_many(&ids).await?;

        let mut by_id: std::collections::HashMap<Uuid, listing::Model> =
            rows.into_iter().map(|r| (r.id, r)).collect();
        let mut result = Vec::with_capacity(favorites.len());
        let mut orphans = 0u32;
        for fav in &favorites {
            match by_id.remove(&fav.listing_id) {
                Some(row) => result.push(row),
                None => orphans += 1,
            }
        }
        if orphans > 0 {
            debug!(user_id = %user_id, orphans, "dropped favorites pointing at deleted listings");
        }
        Ok(result)
    }
}
