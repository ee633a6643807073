// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use tower_http::trace::TraceLayer;
use serde_json::json;

use crate::{
    error::HttpError,
    handler::{
        auth::auth_handler,
        complaints::{agents_handler, complaint_handler},
        pages::pages_handler,
    },
    middleware::{auth, page_gate},
    AppState,
};

// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

async fn fallback() -> HttpError {
    HttpError::not_found("Page not found")
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest(
            "/complaints",
            complaint_handler()
                .layer(middleware::from_fn(auth))
        )
        .nest(
            "/agents",
            agents_handler()
                .layer(middleware::from_fn(auth))
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state.clone()));

    let page_routes = pages_handler()
        .route_layer(middleware::from_fn(page_gate))
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .merge(page_routes)
        .fallback(fallback)
}
