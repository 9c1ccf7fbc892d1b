//! OpenAPI document assembly. The doc structs mirror the wire payloads so
//! the schema stays independent of internal domain types.

use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStatusRequest {
    pub is_active: bool,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::services::browse,
        crate::routes::services::get_listing,
        crate::routes::services::create_listing,
        crate::routes::services::delete_listing,
        crate::routes::favorites::list_favorites,
        crate::routes::favorites::add_favorite,
        crate::routes::favorites::remove_favorite,
        crate::routes::admin::stats,
        crate::routes::admin::list_listings,
        crate::routes::admin::toggle_status,
    ),
    components(schemas(RegisterRequest, LoginRequest, ToggleStatusRequest)),
    tags(
        (name = "auth", description = "Registration and session management"),
        (name = "catalog", description = "Public browsing and seller listings"),
        (name = "favorites", description = "Buyer favorites"),
        (name = "admin", description = "Moderation and platform stats")
    )
)]
pub struct ApiDoc;
