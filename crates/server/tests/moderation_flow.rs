use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use tower::Service;
use uuid::Uuid;

use models::listing::{build, ListingCategory, ListingStatus, NewListing};
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

fn build_app(orders: u64, disputes: u64) -> TestApp {
    let listings = Arc::new(MemoryListingRepository::default());
    let state = ServerState {
        auth: ServerAuthConfig { jwt_secret: SECRET.into() },
        users: Arc::new(MockAuthRepository::default()),
        listings: listings.clone(),
        favorites: Arc::new(MemoryFavoriteRepository::default()),
        orders: Arc::new(MockOrderLedger(orders)),
        disputes: Arc::new(MockDisputeDesk(disputes)),
    };
    TestApp { app: routes::build_router(state, tower_http::cors::CorsLayer::very_permissive()), listings }
}

fn token_for(role: Role) -> String {
    let claims = Claims {
        sub: "someone@example.com".into(),
        uid: Uuid::new_v4().to_string(),
        role: role.as_str().to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn seeded(title: &str, seller: &str, status: ListingStatus) -> models::listing::Model {
    let mut row = build(NewListing {
        title: title.into(),
        description: "desc".into(),
        price: 50.0,
        category: ListingCategory::Design,
        image_url: None,
        seller_id: Uuid::new_v4(),
        seller_name: seller.into(),
    });
    row.status = status;
    row
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    builder.body(Body::empty()).unwrap()
}

fn put_json(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_admin_search_filters_and_hides_sold() {
    let mut t = build_app(0, 0);
    t.listings.seed(seeded("Logo Design", "Ann", ListingStatus::Active));
    t.listings.seed(seeded("Garden work", "Logomaker", ListingStatus::Inactive));
    t.listings.seed(seeded("Logo refresh", "Cay", ListingStatus::Sold));
    let token = token_for(Role::Admin);

    let resp = t.app.call(get("/admin/services?search=logo", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    // Case-insensitive match on title or seller name, sold rows excluded
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let resp = t
        .app
        .call(get("/admin/services?search=logo&include_sold=true", Some(&token)))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_toggle_status_flips_and_flips_back() {
    let mut t = build_app(0, 0);
    let row = seeded("Logo Design", "Ann", ListingStatus::Active);
    t.listings.seed(row.clone());
    let token = token_for(Role::Admin);
    let uri = format!("/admin/services/{}/status", row.id);

    let resp = t.app.call(put_json(&uri, &token, json!({"isActive": false}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["status"], "inactive");

    let resp = t.app.call(put_json(&uri, &token, json!({"isActive": true}))).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["status"], "active");
}

#[tokio::test]
async fn test_toggle_on_sold_listing_conflicts() {
    let mut t = build_app(0, 0);
    let row = seeded("Sold thing", "Ann", ListingStatus::Sold);
    t.listings.seed(row.clone());
    let token = token_for(Role::Admin);

    let resp = t
        .app
        .call(put_json(&format!("/admin/services/{}/status", row.id), &token, json!({"isActive": false})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_regular_users() {
    let mut t = build_app(0, 0);
    let row = seeded("Logo Design", "Ann", ListingStatus::Active);
    t.listings.seed(row.clone());
    let token = token_for(Role::User);

    let resp = t.app.call(get("/admin/services", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = t.app.call(get("/admin/stats", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = t
        .app
        .call(put_json(&format!("/admin/services/{}/status", row.id), &token, json!({"isActive": false})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    // and the listing is untouched
    assert_eq!(t.listings.get(row.id).await.unwrap().unwrap().status, ListingStatus::Active);
}

#[tokio::test]
async fn test_admin_routes_require_a_session() {
    let mut t = build_app(0, 0);
    let resp = t.app.call(get("/admin/services", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please sign in to continue");
}

#[tokio::test]
async fn test_stats_reports_current_counts() {
    let mut t = build_app(7, 2);
    t.listings.seed(seeded("One", "Ann", ListingStatus::Active));
    t.listings.seed(seeded("Two", "Ann", ListingStatus::Sold));
    let token = token_for(Role::Admin);

    let resp = t.app.call(get("/admin/stats", Some(&token))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["listingCount"], 2);
    assert_eq!(body["data"]["orderCount"], 7);
    assert_eq!(body["data"]["openDisputeCount"], 2);
    assert_eq!(body["data"]["userCount"], 0);
}
