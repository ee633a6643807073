//8
mod models;
mod service;
mod config;
mod dtos;
mod error;
mod db;
mod utils;
mod middleware;
mod handler;
mod routes;

use std::sync::Arc;

use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use axum_extra::extract::cookie::CookieJar;
use config::Config;
use db::DBClient;
use dotenv::dotenv;
use routes::create_router;
use service::{complaint_service::ComplaintService, session::SessionStore};
use tower_http::cors::{AllowOrigin, CorsLayer};
use utils::token::TokenCookieStorage;

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub complaint_service: Arc<ComplaintService>,
}

impl AppState {
    pub fn new(db_client: Arc<DBClient>, env: Config) -> Self {
        let complaint_service = Arc::new(ComplaintService::new(
            db_client.clone(),
            env.latency.clone(),
        ));

        AppState {
            env,
            db_client,
            complaint_service,
        }
    }

    /// A session for one request, backed by its `token` cookie or bearer header.
    pub fn session_store(
        &self,
        cookie_jar: CookieJar,
        bearer: Option<String>,
    ) -> SessionStore<TokenCookieStorage> {
        let storage = TokenCookieStorage::new(
            cookie_jar,
            bearer,
            self.env.jwt_secret.clone(),
            self.env.jwt_maxage,
        );
        SessionStore::new(storage, self.env.latency.clone())
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("🔥 Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
    .with_max_level(config.log_level)
    .init();

    let db_client = Arc::new(DBClient::new());
    if config.seed_fixtures {
        db_client.seed_if_empty().await;
    }

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT]);

    let app_state = AppState::new(db_client, config.clone());

    let app = create_router(Arc::new(app_state)).layer(cors);

    tracing::info!(
        "🚀 Server is running on http://localhost:{} (latency: {:?})",
        config.port,
        config.latency
    );

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind port {}: {}", config.port, err);
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
    }
}
