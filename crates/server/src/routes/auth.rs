use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Serialize;
use uuid::Uuid;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repository::AuthRepository;
use service::auth::service::{AuthConfig, Claims};
use service::auth::AuthService;
use service::catalog::repository::ListingRepository;
use service::catalog::CatalogService;
use service::favorites::repository::FavoriteRepository;
use service::favorites::FavoritesService;
use service::moderation::ModerationService;
use service::session::{parse_role, Principal, Role};
use service::stats::{DisputeDesk, OrderLedger, StatsService};

use crate::errors::{ApiResponse, JsonApiError};

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

/// Shared request state: repositories as trait objects so tests can swap the
/// SeaORM implementations for the in-memory ones.
#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub users: Arc<dyn AuthRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub orders: Arc<dyn OrderLedger>,
    pub disputes: Arc<dyn DisputeDesk>,
}

impl ServerState {
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            self.users.clone(),
            AuthConfig { jwt_secret: Some(self.auth.jwt_secret.clone()), password_algorithm: "argon2".into() },
        )
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.listings.clone(), self.favorites.clone(), self.users.clone())
    }

    pub fn moderation_service(&self) -> ModerationService {
        ModerationService::new(self.listings.clone())
    }

    pub fn favorites_service(&self) -> FavoritesService {
        FavoritesService::new(self.favorites.clone(), self.listings.clone())
    }

    pub fn stats_service(&self) -> StatsService {
        StatsService::new(self.listings.clone(), self.users.clone(), self.orders.clone(), self.disputes.clone())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOutput {
    pub user_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub token: String,
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<ApiResponse<RegisterOutput>>, JsonApiError> {
    let user = state.auth_service().register(input).await?;
    Ok(ApiResponse::ok(RegisterOutput { user_id: user.id }))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<ApiResponse<LoginOutput>>), JsonApiError> {
    let session = state.auth_service().login(input).await?;
    let user = session.user;
    let Some(token) = session.token else {
        return Err(JsonApiError::new(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "token generation failed"));
    };

    let mut cookie = Cookie::new("auth_token", token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
    let jar = jar.add(cookie);

    let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, role: user.role, token };
    Ok((jar, ApiResponse::ok(out)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<serde_json::Value>>) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, ApiResponse::message("signed out"))
}

/// 会话中间件：优先读取 Authorization: Bearer <token>，缺失时回退到
/// auth_token Cookie；校验通过后把 Principal 注入请求扩展。
pub async fn require_session(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let token = {
        let authz = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Some(h) = authz {
            let Some(rest) = h.strip_prefix("Bearer ") else {
                tracing::warn!(path = %req.uri().path(), "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::unauthenticated());
            };
            rest.to_string()
        } else {
            // Cookie 回退：从 Cookie 头解析 auth_token
            let cookie_header = req
                .headers()
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let mut token_val: Option<String> = None;
            for part in cookie_header.split(';') {
                if let Some(rest) = part.trim().strip_prefix("auth_token=") {
                    token_val = Some(rest.to_string());
                    break;
                }
            }
            match token_val {
                Some(t) if !t.is_empty() => t,
                _ => return Err(JsonApiError::unauthenticated()),
            }
        }
    };

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(&token, &key, &validation).map_err(|e| {
        tracing::warn!(error = %e, "token validation failed");
        JsonApiError::unauthenticated()
    })?;

    let user_id = Uuid::parse_str(&data.claims.uid).map_err(|_| JsonApiError::unauthenticated())?;
    let role = parse_role(&data.claims.role).ok_or_else(JsonApiError::unauthenticated)?;

    req.extensions_mut().insert(Principal { user_id, role });
    Ok(next.run(req).await)
}
