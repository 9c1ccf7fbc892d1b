//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Enforces authorization through the shared capability checks in `session`.

pub mod errors;
pub mod pagination;
pub mod session;
pub mod auth;
pub mod catalog;
pub mod favorites;
pub mod moderation;
pub mod stats;
