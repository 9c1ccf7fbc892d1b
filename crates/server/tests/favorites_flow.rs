use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::Service;
use uuid::Uuid;

use models::listing::{build, ListingCategory, NewListing};
use server::routes::{self, auth::{ServerAuthConfig, ServerState}};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::service::Claims;
use service::catalog::repository::mock::MemoryListingRepository;
use service::catalog::repository::ListingRepository;
use service::favorites::repository::mock::MemoryFavoriteRepository;
use service::session::Role;
use service::stats::mock::{MockDisputeDesk, MockOrderLedger};

const SECRET: &str = "test-secret";

struct TestApp {
    app: Router,
    listings: Arc<MemoryListingRepository>,
}

fn build_app() -> TestApp {
    let listings = Arc::new(MemoryListingRepository::default());
    let state = ServerState {
        auth: ServerAuthConfig { jwt_secret: SECRET.into() },
        users: Arc::new(MockAuthRepository::default()),
        listings: listings.clone(),
        favorites: Arc::new(MemoryFavoriteRepository::default()),
        orders: Arc::new(MockOrderLedger(0)),
        disputes: Arc::new(MockDisputeDesk(0)),
    };
    TestApp { app: routes::build_router(state, tower_http::cors::CorsLayer::very_permissive()), listings }
}

fn user_token(user_id: Uuid) -> String {
    let claims = Claims {
        sub: "buyer@example.com".into(),
        uid: user_id.to_string(),
        role: Role::User.as_str().to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn listing_row(title: &str) -> models::listing::Model {
    build(NewListing {
        title: title.into(),
        description: "desc".into(),
        price: 15.0,
        category: ListingCategory::Art,
        image_url: None,
        seller_id: Uuid::new_v4(),
        seller_name: "Ann".into(),
    })
}

fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_double_favorite_lists_once() {
    let mut t = build_app();
    let row = listing_row("Watercolor");
    t.listings.seed(row.clone());
    let token = user_token(Uuid::new_v4());
    let uri = format!("/api/favorites/{}", row.id);

    let resp = t.app.call(request("POST", &uri, Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = t.app.call(request("POST", &uri, Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = t.app.call(request("GET", "/api/favorites", Some(&token))).await.unwrap();
    let body = body_json(resp).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], row.id.to_string());
    assert_eq!(data[0]["price"], 15.0);
}

#[tokio::test]
async fn test_removing_missing_favorite_succeeds() {
    let mut t = build_app();
    let token = user_token(Uuid::new_v4());
    let resp = t
        .app
        .call(request("DELETE", &format!("/api/favorites/{}", Uuid::new_v4()), Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_favoriting_unknown_listing_is_not_found() {
    let mut t = build_app();
    let token = user_token(Uuid::new_v4());
    let resp = t
        .app
        .call(request("POST", &format!("/api/favorites/{}", Uuid::new_v4()), Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_listing_disappears_from_favorites() {
    let mut t = build_app();
    let kept = listing_row("Kept");
    let doomed = listing_row("Doomed");
    t.listings.seed(kept.clone());
    t.listings.seed(doomed.clone());
    let token = user_token(Uuid::new_v4());

    for row in [&kept, &doomed] {
        let resp = t
            .app
            .call(request("POST", &format!("/api/favorites/{}", row.id), Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // Listing removed while its favorite row still exists (lagging cascade)
    t.listings.delete(doomed.id).await.unwrap();

    let resp = t.app.call(request("GET", "/api/favorites", Some(&token))).await.unwrap();
    let body = body_json(resp).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], kept.id.to_string());
}

#[tokio::test]
async fn test_favorites_require_a_session() {
    let mut t = build_app();
    let resp = t.app.call(request("GET", "/api/favorites", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please sign in to continue");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let mut t = build_app();
    let claims = Claims {
        sub: "buyer@example.com".into(),
        uid: Uuid::new_v4().to_string(),
        role: "user".into(),
        exp: (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp() as usize,
    };
    let stale = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
    let resp = t.app.call(request("GET", "/api/favorites", Some(&stale))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
