use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::listing::{self, ListingCategory, ListingStatus};
use service::catalog::service::CreateListingInput;
use service::pagination::Pagination;
use service::session::Principal;

use crate::errors::{ApiResponse, JsonApiError};
use crate::routes::auth::ServerState;

/// Listing as rendered to clients: price normalized, placeholder image
/// resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingOut {
    pub id: Uuid,
    pub title: String,
    pub description: String,
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

impl From<listing::Model> for ListingOut {
    fn from(row: listing::Model) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
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

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

fn page_of(page: Option<u32>, per_page: Option<u32>) -> Pagination {
    let d = Pagination::default();
    Pagination { page: page.unwrap_or(d.page), per_page: per_page.unwrap_or(d.per_page) }
}

/// 公开浏览：仅展示 active 状态的列表
#[utoipa::path(get, path = "/api/services", tag = "catalog", responses((status = 200, description = "OK"), (status = 400, description = "Bad Request")))]
pub async fn browse(
    State(state): State<ServerState>,
    Query(q): Query<BrowseQuery>,
) -> Result<Json<ApiResponse<Vec<ListingOut>>>, JsonApiError> {
    let rows = state
        .catalog_service()
        .browse(q.search, q.category, page_of(q.page, q.per_page))
        .await?;
    Ok(ApiResponse::ok(rows.into_iter().map(ListingOut::from).collect()))
}

/// 获取单个列表详情
#[utoipa::path(get, path = "/api/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "listing id")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_listing(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ListingOut>>, JsonApiError> {
    let row = state.catalog_service().get(id).await?;
    Ok(ApiResponse::ok(ListingOut::from(row)))
}

/// 卖家发布新列表
#[utoipa::path(post, path = "/api/services", tag = "catalog", responses((status = 200, description = "Created"), (status = 400, description = "Bad Request"), (status = 401, description = "Unauthorized")))]
pub async fn create_listing(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateListingInput>,
) -> Result<Json<ApiResponse<ListingOut>>, JsonApiError> {
    let created = state.catalog_service().create(&principal, input).await?;
    info!(listing_id = %created.id, "listing created via api");
    Ok(ApiResponse::ok(ListingOut::from(created)))
}

/// 删除列表（所有者或管理员），并级联清理收藏
#[utoipa::path(delete, path = "/api/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "listing id")), responses((status = 200, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn delete_listing(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, JsonApiError> {
    state.catalog_service().delete(&principal, id).await?;
    Ok(ApiResponse::message("listing deleted"))
}
