use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::catalog::SeaOrmListingRepository;
use service::favorites::SeaOrmFavoriteRepository;
use service::stats::{SeaOrmDisputeDesk, SeaOrmOrderLedger};

use crate::routes::{self, auth};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // DB connection; 启动时应用迁移，保证表结构就绪
    let db = models::db::connect().await?;
    migration::Migrator::up(&db, None).await?;

    let jwt_secret =
        std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());
    let state = auth::ServerState {
        auth: auth::ServerAuthConfig { jwt_secret },
        users: Arc::new(SeaOrmAuthRepository { db: db.clone() }),
        listings: Arc::new(SeaOrmListingRepository { db: db.clone() }),
        favorites: Arc::new(SeaOrmFavoriteRepository { db: db.clone() }),
        orders: Arc::new(SeaOrmOrderLedger { db: db.clone() }),
        disputes: Arc::new(SeaOrmDisputeDesk { db }),
    };

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(state, cors);

    // Bind and serve
    let addr = load_bind_addr()?;
    info!(%addr, "starting marketplace server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
