pub mod admin;
pub mod auth;
pub mod favorites;
pub mod services;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::routes::auth::ServerState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public, session-protected and admin
/// routes. Role checks live in the service layer; the middleware here only
/// resolves the Principal.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/api/services", get(services::browse))
        .route("/api/services/:id", get(services::get_listing));

    // Everything below requires a resolved session
    let protected = Router::new()
        .route("/api/services", post(services::create_listing))
        .route("/api/services/:id", delete(services::delete_listing))
        .route("/api/favorites", get(favorites::list_favorites))
        .route(
            "/api/favorites/:id",
            post(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route("/admin/stats", get(admin::stats))
        .route("/admin/services", get(admin::list_listings))
        .route("/admin/services/:id/status", put(admin::toggle_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_session));

    let docs = SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi());

    public
        .merge(protected)
        .merge(docs)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法与路径，级别 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
