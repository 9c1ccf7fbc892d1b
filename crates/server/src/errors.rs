use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Uniform boundary envelope: `{success, data?, message?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data: Some(data), message: None })
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn message(msg: impl Into<String>) -> Json<Self> {
        Json(Self { success: true, data: None, message: Some(msg.into()) })
    }
}

/// Failure response carrying the mapped status code; serialized through the
/// same envelope with `success: false`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// The not-signed-in response; the frontend redirects to the login page
    /// on this message.
    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Please sign in to continue")
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        }
        (
            self.status,
            Json(serde_json::json!({ "success": false, "message": self.message })),
        )
            .into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Unauthorized(_) => Self::unauthenticated(),
            ServiceError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, msg),
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            ServiceError::InvalidTransition(msg) => Self::new(StatusCode::CONFLICT, msg),
            ServiceError::Db(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "user already exists"),
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, "user not found"),
            AuthError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "invalid credentials"),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}
