use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use service::moderation::ListingSummary;
use service::pagination::Pagination;
use service::session::Principal;
use service::stats::PlatformStats;

use crate::errors::{ApiResponse, JsonApiError};
use crate::routes::auth::ServerState;
use crate::routes::services::ListingOut;

/// 平台统计：用户/列表/订单/未结纠纷数量，按需实时计算
#[utoipa::path(get, path = "/admin/stats", tag = "admin", responses((status = 200, description = "OK"), (status = 403, description = "Forbidden")))]
pub async fn stats(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<PlatformStats>>, JsonApiError> {
    let stats = state.stats_service().platform_stats(&principal).await?;
    Ok(ApiResponse::ok(stats))
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub include_sold: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// 管理端列表检索：默认隐藏已售出（sold）的记录
#[utoipa::path(get, path = "/admin/services", tag = "admin", responses((status = 200, description = "OK"), (status = 403, description = "Forbidden")))]
pub async fn list_listings(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Query(q): Query<AdminListQuery>,
) -> Result<Json<ApiResponse<Vec<ListingSummary>>>, JsonApiError> {
    let d = Pagination::default();
    let page = Pagination { page: q.page.unwrap_or(d.page), per_page: q.per_page.unwrap_or(d.per_page) };
    let rows = state
        .moderation_service()
        .list_for_moderation(&principal, q.search, q.include_sold, page)
        .await?;
    Ok(ApiResponse::ok(rows))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStatusInput {
    pub is_active: bool,
}

/// 上/下架切换。请求体中的 isActive 表达的是切换意图；实际状态在
/// 状态机的 CAS 保护下翻转，已售出的列表会拒绝该操作。
#[utoipa::path(put, path = "/admin/services/{id}/status", tag = "admin", request_body = crate::openapi::ToggleStatusRequest, params(("id" = Uuid, Path, description = "listing id")), responses((status = 200, description = "Toggled"), (status = 403, description = "Forbidden"), (status = 409, description = "Invalid Transition")))]
pub async fn toggle_status(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(input): Json<ToggleStatusInput>,
) -> Result<Json<ApiResponse<ListingOut>>, JsonApiError> {
    debug!(listing_id = %id, requested_active = input.is_active, "status toggle requested");
    let updated = state.moderation_service().toggle_status(&principal, id).await?;
    Ok(ApiResponse::ok(ListingOut::from(updated)))
}
