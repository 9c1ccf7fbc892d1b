//! Platform-wide counts for the admin dashboard. Every call recomputes from
//! the authoritative stores; correctness over latency for this
//! low-frequency read, so there is no cache to invalidate.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;

use crate::auth::repository::AuthRepository;
use crate::catalog::repository::ListingRepository;
use crate::errors::ServiceError;
use crate::session::{self, Principal, Role};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub user_count: u64,
    pub listing_count: u64,
    pub order_count: u64,
    pub open_dispute_count: u64,
}

/// Order store collaborator; order placement lives outside this service.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn count_orders(&self) -> Result<u64, ServiceError>;
}

/// Dispute store collaborator.
#[async_trait]
pub trait DisputeDesk: Send + Sync {
    async fn count_open_disputes(&self) -> Result<u64, ServiceError>;
}

pub struct SeaOrmOrderLedger {
    pub db: DatabaseConnection,
}

#[async_trait]
impl OrderLedger for SeaOrmOrderLedger {
    async fn count_orders(&self) -> Result<u64, ServiceError> {
        models::order::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }
}

pub struct SeaOrmDisputeDesk {
    pub db: DatabaseConnection,
}

#[async_trait]
impl DisputeDesk for SeaOrmDisputeDesk {
    async fn count_open_disputes(&self) -> Result<u64, ServiceError> {
        models::dispute::Entity::find()
            .filter(models::dispute::Column::Status.eq(models::dispute::STATUS_OPEN))
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }
}

pub struct StatsService {
    listings: Arc<dyn ListingRepository>,
    users: Arc<dyn AuthRepository>,
    orders: Arc<dyn OrderLedger>,
    disputes: Arc<dyn DisputeDesk>,
}

impl StatsService {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        users: Arc<dyn AuthRepository>,
        orders: Arc<dyn OrderLedger>,
        disputes: Arc<dyn DisputeDesk>,
    ) -> Self {
        Self { listings, users, orders, disputes }
    }

    #[instrument(skip(self, principal))]
    pub async fn platform_stats(&self, principal: &Principal) -> Result<PlatformStats, ServiceError> {
        session::require_role(principal, Role::Admin)?;
        let user_count = self.users.count_users().await.map_err(ServiceError::from)?;
        let listing_count = self.listings.count().await?;
        let order_count = self.orders.count_orders().await?;
        let open_dispute_count = self.disputes.count_open_disputes().await?;
        Ok(PlatformStats { user_count, listing_count, order_count, open_dispute_count })
    }
}

/// Fixed-count collaborators for tests.
pub mod mock {
    use super::*;

    pub struct MockOrderLedger(pub u64);

    #[async_trait]
    impl OrderLedger for MockOrderLedger {
        async fn count_orders(&self) -> Result<u64, ServiceError> {
            Ok(self.0)
        }
    }

    pub struct MockDisputeDesk(pub u64);

    #[async_trait]
    impl DisputeDesk for MockDisputeDesk {
        async fn count_open_disputes(&self) -> Result<u64, ServiceError> {
            Ok(self.0)
        }
    }
}
