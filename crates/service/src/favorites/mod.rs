//! Favorites store and the buyer-facing favorites operations.

pub mod repository;
pub mod service;

pub use repository::{FavoriteRepository, SeaOrmFavoriteRepository};
pub use service::FavoritesService;
