use thiserror::Error;

use crate::auth::errors::AuthError;
use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

// Store errors bubble to the boundary unchanged in meaning.
impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::Validation(msg),
            ModelError::InvalidTransition(msg) => Self::InvalidTransition(msg),
            ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => Self::Validation(msg),
            AuthError::Conflict => Self::Validation("user already exists".into()),
            AuthError::NotFound => Self::not_found("user"),
            AuthError::Unauthorized => Self::Unauthorized("invalid credentials".into()),
            AuthError::HashError(msg) | AuthError::TokenError(msg) | AuthError::Repository(msg) => Self::Db(msg),
        }
    }
}
