//! Listing store: repository abstraction over the `listing` table plus the
//! seller/buyer-facing catalog operations.

pub mod repository;
pub mod service;

pub use repository::{ListingRepository, SearchFilter, SeaOrmListingRepository};
pub use service::CatalogService;
