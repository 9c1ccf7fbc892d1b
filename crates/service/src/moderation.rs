//! Administrator workflow over listings: the moderation queue and the
//! active/inactive toggle. Stateless per call; rapid repeated searches are
//! each served independently (debounce belongs to the client).

use std::sync::Arc;

use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::repository::{ListingRepository, SearchFilter};
use crate::catalog::service::update_status_with;
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::session::{self, Principal, Role};
use models::listing::{self, ListingCategory, ListingStatus};

/// Row shape for the moderation queue. Carries the denormalized seller name
/// and the normalized price so the view never touches raw rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub category: ListingCategory,
    pub image_url: String,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub rating: f64,
    pub review_count: i32,
    pub status: ListingStatus,
    pub created_at: DateTimeWithTimeZone,
}

impl From<listing::Model> for ListingSummary {
    fn from(row: listing::Model) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            price: row.effective_price(),
            category: row.category,
            image_url: row.image_or_placeholder().to_string(),
            seller_id: row.seller_id,
            seller_name: row.seller_name,
            rating: row.rating,
            review_count: row.review_count,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

pub struct ModerationService {
    listings: Arc<dyn ListingRepository>,
}

impl ModerationService {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    /// Admin search across active and inactive listings. Sold rows stay out
    /// of the queue unless explicitly requested; they are not actionable.
    #[instrument(skip(self, principal))]
    pub async fn list_for_moderation(
        &self,
        principal: &Principal,
        search_text: Option<String>,
        include_sold: bool,
        page: Pagination,
    ) -> Result<Vec<ListingSummary>, ServiceError> {
        session::require_role(principal, Role::Admin)?;
        let filter = SearchFilter { text: search_text, status: None, category: None, include_sold };
        let rows = self.listings.search(&filter, page).await?;
        Ok(rows.into_iter().map(ListingSummary::from).collect())
    }

    /// The only administrator-facing mutation: flip active ↔ inactive under
    /// the status CAS. Sold listings reject the toggle.
    #[instrument(skip(self, principal), fields(listing_id = %id))]
    pub async fn toggle_status(&self, principal: &Principal, id: Uuid) -> Result<listing::Model, ServiceError> {
        session::require_role(principal, Role::Admin)?;
        let updated = update_status_with(self.listings.as_ref(), id, |current| current.toggled()).await?;
        info!(status = updated.status.as_str(), "listing_status_toggled");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository::mock::MemoryListingRepository;
    use models::listing::{build, NewListing};

    fn seeded(title: &str, seller: &str) -> listing::Model {
        build(NewListing {
            title: title.into(),
            description: "desc".into(),
            price: 40.0,
            category: ListingCategory::Design,
            image_url: None,
            seller_id: Uuid::new_v4(),
            seller_name: seller.into(),
        })
    }

    fn fixture() -> (ModerationService, Arc<MemoryListingRepository>) {
        let listings = Arc::new(MemoryListingRepository::default());
        (ModerationService::new(listings.clone()), listings)
    }

    fn admin() -> Principal {
        Principal { user_id: Uuid::new_v4(), role: Role::Admin }
    }

    #[tokio::test]
    async fn search_matches_title_or_seller_case_insensitively() {
        let (svc, listings) = fixture();
        listings.seed(seeded("Logo Design", "Ann"));
        listings.seed(seeded("House cleaning", "Logomaker"));
        listings.seed(seeded("Garden work", "Bob"));

        let rows = svc
            .list_for_moderation(&admin(), Some("logo".into()), false, Pagination::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let rows = svc
            .list_for_moderation(&admin(), Some("GARDEN".into()), false, Pagination::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].seller_name, "Bob");
    }

    #[tokio::test]
    async fn queue_includes_inactive_but_excludes_sold_by_default() {
        let (svc, listings) = fixture();
        let mut inactive = seeded("Inactive one", "Ann");
        inactive.status = ListingStatus::Inactive;
        let mut sold = seeded("Sold one", "Ann");
        sold.status = ListingStatus::Sold;
        listings.seed(seeded("Active one", "Ann"));
        listings.seed(inactive);
        listings.seed(sold);

        let rows = svc
            .list_for_moderation(&admin(), None, false, Pagination::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status != ListingStatus::Sold));

        let rows = svc
            .list_for_moderation(&admin(), None, true, Pagination::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn summaries_normalize_legacy_price_and_image() {
        let (svc, listings) = fixture();
        let mut legacy = seeded("Old import", "Ann");
        legacy.price = None;
        legacy.price_legacy = Some(12.5);
        listings.seed(legacy);

        let rows = svc
            .list_for_moderation(&admin(), None, false, Pagination::default())
            .await
            .unwrap();
        assert_eq!(rows[0].price, 12.5);
        assert_eq!(rows[0].image_url, listing::PLACEHOLDER_IMAGE);
    }

    #[tokio::test]
    async fn toggle_flips_and_flips_back() {
        let (svc, listings) = fixture();
        let row = seeded("Logo Design", "Ann");
        listings.seed(row.clone());

        let toggled = svc.toggle_status(&admin(), row.id).await.unwrap();
        assert_eq!(toggled.status, ListingStatus::Inactive);
        let toggled = svc.toggle_status(&admin(), row.id).await.unwrap();
        assert_eq!(toggled.status, ListingStatus::Active);
    }

    #[tokio::test]
    async fn toggle_on_sold_listing_fails_and_leaves_status_unchanged() {
        let (svc, listings) = fixture();
        let mut row = seeded("Sold out", "Ann");
        row.status = ListingStatus::Sold;
        listings.seed(row.clone());

        let err = svc.toggle_status(&admin(), row.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition(_)));
        assert_eq!(listings.get(row.id).await.unwrap().unwrap().status, ListingStatus::Sold);
    }

    #[tokio::test]
    async fn non_admin_is_forbidden_regardless_of_input() {
        let (svc, listings) = fixture();
        let row = seeded("Logo Design", "Ann");
        listings.seed(row.clone());
        let p = Principal { user_id: Uuid::new_v4(), role: Role::User };

        assert!(matches!(
            svc.list_for_moderation(&p, None, false, Pagination::default()).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(svc.toggle_status(&p, row.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(svc.toggle_status(&p, Uuid::new_v4()).await, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn unknown_listing_toggle_is_not_found() {
        let (svc, _) = fixture();
        let err = svc.toggle_status(&admin(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
