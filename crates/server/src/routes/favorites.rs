use axum::{
    extract::{Extension, Path, State},
    Json,
};
use uuid::Uuid;

use service::session::Principal;

use crate::errors::{ApiResponse, JsonApiError};
use crate::routes::auth::ServerState;
use crate::routes::services::ListingOut;

/// 当前用户收藏的列表（已删除的列表会被过滤掉）
#[utoipa::path(get, path = "/api/favorites", tag = "favorites", responses((status = 200, description = "OK"), (status = 401, description = "Unauthorized")))]
pub async fn list_favorites(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<ListingOut>>>, JsonApiError> {
    let rows = state
        .favorites_service()
        .list(&principal, principal.user_id)
        .await?;
    Ok(ApiResponse::ok(rows.into_iter().map(ListingOut::from).collect()))
}

/// 收藏一个列表；重复收藏是幂等的成功
#[utoipa::path(post, path = "/api/favorites/{id}", tag = "favorites", params(("id" = Uuid, Path, description = "listing id")), responses((status = 200, description = "Saved"), (status = 404, description = "Not Found")))]
pub async fn add_favorite(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, JsonApiError> {
    state
        .favorites_service()
        .add(&principal, principal.user_id, id)
        .await?;
    Ok(ApiResponse::message("favorite saved"))
}

/// 取消收藏；不存在的收藏同样返回成功
#[utoipa::path(delete, path = "/api/favorites/{id}", tag = "favorites", params(("id" = Uuid, Path, description = "listing id")), responses((status = 200, description = "Removed"), (status = 401, description = "Unauthorized")))]
pub async fn remove_favorite(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, JsonApiError> {
    state
        .favorites_service()
        .remove(&principal, principal.user_id, id)
        .await?;
    Ok(ApiResponse::message("favorite removed"))
}
