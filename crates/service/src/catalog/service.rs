use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::repository::AuthRepository;
use crate::errors::ServiceError;
use crate::favorites::repository::FavoriteRepository;
use crate::pagination::Pagination;
use crate::session::{self, Principal, Role};
use models::errors::ModelError;
use models::listing::{self, ListingStatus, NewListing};

use super::repository::{ListingRepository, SearchFilter};

/// Raw listing payload as submitted by a seller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingInput {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Seller/buyer-facing catalog operations. Deleting a listing triggers the
/// favorites cascade; the favorites store never deletes a listing.
pub struct CatalogService {
    listings: Arc<dyn ListingRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    users: Arc<dyn AuthRepository>,
}

/// Re-read/validate/CAS loop shared by every status mutation. `next`
/// computes the target from the freshly read state, so a caller that loses
/// a race retries against current data instead of clobbering it.
pub(crate) async fn update_status_with<F>(
    listings: &dyn ListingRepository,
    id: Uuid,
    next: F,
) -> Result<listing::Model, ServiceError>
where
    F: Fn(ListingStatus) -> Result<ListingStatus, ModelError>,
{
    const MAX_RACE_RETRIES: u32 = 3;
    for _ in 0..MAX_RACE_RETRIES {
        let current = listings
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("listing"))?;
        let target = next(current.status)?;
        if listings
            .compare_and_set_status(id, current.status, target)
            .await?
        {
            let mut updated = current;
            updated.status = target;
            return Ok(updated);
        }
    }
    Err(ServiceError::Db("status update kept losing races, giving up".into()))
}

impl CatalogService {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        favorites: Arc<dyn FavoriteRepository>,
        users: Arc<dyn AuthRepository>,
    ) -> Self {
        Self { listings, favorites, users }
    }

    /// Create a listing owned by the caller. The seller display name is
    /// captured here; later renames are not propagated to existing rows.
    #[instrument(skip(self, input), fields(seller_id = %principal.user_id))]
    pub async fn create(&self, principal: &Principal, input: CreateListingInput) -> Result<listing::Model, ServiceError> {
        session::require_role(principal, Role::User)?;
        listing::validate_title(&input.title)?;
        listing::validate_description(&input.description)?;
        listing::validate_price(input.price)?;
        let category = listing::parse_category(&input.category)?;

        let seller = self
            .users
            .find_user_by_id(principal.user_id)
            .await
            .map_err(ServiceError::from)?
            .ok_or_else(|| ServiceError::Unauthorized("account no longer exists".into()))?;

        let created = self
            .listings
            .create(NewListing {
                title: input.title,
                description: input.description,
                price: input.price,
                category,
                image_url: input.image_url,
                seller_id: principal.user_id,
                seller_name: seller.name,
            })
            .await?;
        info!(listing_id = %created.id, "listing_created");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<listing::Model, ServiceError> {
        self.listings
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("listing"))
    }

    /// Public browse: only active listings are shown to buyers.
    pub async fn browse(
        &self,
        text: Option<String>,
        category: Option<String>,
        page: Pagination,
    ) -> Result<Vec<listing::Model>, ServiceError> {
        let category = match category {
            Some(raw) => Some(listing::parse_category(&raw)?),
            None => None,
        };
        let filter = SearchFilter {
            text,
            status: Some(ListingStatus::Active),
            category,
            include_sold: false,
        };
        self.listings.search(&filter, page).await
    }

    /// Remove a listing (owner or administrator), then cascade favorites
    /// cleanup. The cascade is allowed to lag; the favorites join filters
    /// orphans in the meantime.
    #[instrument(skip(self), fields(listing_id = %id))]
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError> {
        let row = self.get(id).await?;
        session::require_owner_or_admin(principal, row.seller_id)?;

        if !self.listings.delete(id).await? {
            return Err(ServiceError::not_found("listing"));
        }
        match self.favorites.remove_for_listing(id).await {
            Ok(removed) => info!(listing_id = %id, removed, "listing_deleted"),
            Err(e) => warn!(listing_id = %id, error = %e, "favorites cascade cleanup failed"),
        }
        Ok(())
    }

    /// One-directional move invoked by the purchase flow; not exposed to
    /// administrators or sellers over HTTP.
    pub async fn mark_sold(&self, id: Uuid) -> Result<listing::Model, ServiceError> {
        update_status_with(self.listings.as_ref(), id, |current| {
            current.ensure_transition(ListingStatus::Sold)?;
            Ok(ListingStatus::Sold)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::catalog::repository::mock::MemoryListingRepository;
    use crate::favorites::repository::mock::MemoryFavoriteRepository;

    struct Fixture {
        svc: CatalogService,
        listings: Arc<MemoryListingRepository>,
        favorites: Arc<MemoryFavoriteRepository>,
        users: Arc<MockAuthRepository>,
    }

    async fn fixture() -> (Fixture, Principal) {
        let listings = Arc::new(MemoryListingRepository::default());
        let favorites = Arc::new(MemoryFavoriteRepository::default());
        let users = Arc::new(MockAuthRepository::default());
        let seller = users.create_user("seller@example.com", "Ann", Role::User).await.unwrap();
        let svc = CatalogService::new(listings.clone(), favorites.clone(), users.clone());
        let principal = Principal { user_id: seller.id, role: Role::User };
        (Fixture { svc, listings, favorites, users }, principal)
    }

    fn input(title: &str) -> CreateListingInput {
        CreateListingInput {
            title: title.into(),
            description: "Something handmade".into(),
            price: 25.0,
            category: "crafts".into(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_active_with_timestamps_and_seller_name() {
        let (fx, principal) = fixture().await;
        let created = fx.svc.create(&principal, input("Wool scarf")).await.unwrap();
        assert_eq!(created.status, ListingStatus::Active);
        assert_eq!(created.seller_name, "Ann");
        assert_eq!(created.seller_id, principal.user_id);

        let fetched = fx.svc.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_rejects_unknown_category_and_bad_fields() {
        let (fx, principal) = fixture().await;

        let mut bad = input("Scarf");
        bad.category = "cooking".into();
        let err = fx.svc.create(&principal, bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("category")));

        let mut bad = input("");
        bad.title = "   ".into();
        let err = fx.svc.create(&principal, bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("title")));

        let mut bad = input("Scarf");
        bad.price = -5.0;
        let err = fx.svc.create(&principal, bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("price")));
    }

    #[tokio::test]
    async fn browse_shows_only_active_listings() {
        let (fx, principal) = fixture().await;
        let a = fx.svc.create(&principal, input("Visible")).await.unwrap();
        let b = fx.svc.create(&principal, input("Hidden")).await.unwrap();
        fx.listings.compare_and_set_status(b.id, ListingStatus::Active, ListingStatus::Inactive).await.unwrap();

        let rows = fx.svc.browse(None, None, Pagination::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, a.id);
    }

    #[tokio::test]
    async fn delete_requires_owner_or_admin_and_cascades_favorites() {
        let (fx, principal) = fixture().await;
        let created = fx.svc.create(&principal, input("Scarf")).await.unwrap();

        let buyer = fx.users.create_user("buyer@example.com", "Bea", Role::User).await.unwrap();
        fx.favorites.add(buyer.id, created.id).await.unwrap();

        let stranger = Principal { user_id: Uuid::new_v4(), role: Role::User };
        assert!(matches!(
            fx.svc.delete(&stranger, created.id).await,
            Err(ServiceError::Forbidden(_))
        ));

        fx.svc.delete(&principal, created.id).await.unwrap();
        assert!(matches!(fx.svc.get(created.id).await, Err(ServiceError::NotFound(_))));
        assert!(fx.favorites.list_for_user(buyer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_sold_is_terminal() {
        let (fx, principal) = fixture().await;
        let created = fx.svc.create(&principal, input("Scarf")).await.unwrap();

        let sold = fx.svc.mark_sold(created.id).await.unwrap();
        assert_eq!(sold.status, ListingStatus::Sold);

        let err = fx.svc.mark_sold(created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn missing_listing_is_not_found() {
        let (fx, _) = fixture().await;
        assert!(matches!(fx.svc.get(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }
}
