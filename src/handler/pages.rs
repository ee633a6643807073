// src/handler/pages.rs
//! JSON view models for the browser routes. `page_gate` has already run, so protected
//! views can rely on the session extension being present.
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dtos::ComplaintQueryParams,
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddeware,
    models::usermodel::Identity,
    service::{error::ServiceError, views},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

pub fn pages_handler() -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/dashboard", get(dashboard_page))
        .route("/submit-complaint", get(submit_complaint_page))
        .route("/complaint/:complaint_id", get(complaint_page))
        .route("/admin", get(admin_page))
        .route("/agent", get(agent_page))
}

fn viewer(auth: &Option<Extension<JWTAuthMiddeware>>) -> Option<&Identity> {
    auth.as_ref().map(|Extension(auth)| &auth.user)
}

pub async fn home_page(auth: Option<Extension<JWTAuthMiddeware>>) -> impl IntoResponse {
    Json(views::public_view("home", viewer(&auth), None))
}

pub async fn login_page(
    auth: Option<Extension<JWTAuthMiddeware>>,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    Json(views::public_view("login", viewer(&auth), query.from))
}

pub async fn register_page(auth: Option<Extension<JWTAuthMiddeware>>) -> impl IntoResponse {
    Json(views::public_view("register", viewer(&auth), None))
}

pub async fn dashboard_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(params): Query<ComplaintQueryParams>,
) -> Result<impl IntoResponse, HttpError> {
    let selected = views::parse_status_filter(params.status.as_deref())?;
    let complaints = app_state
        .complaint_service
        .user_complaints(&auth.user, None)
        .await?;

    Ok(Json(views::user_dashboard(&auth.user, &complaints, selected)))
}

pub async fn submit_complaint_page() -> impl IntoResponse {
    Json(views::submit_form())
}

pub async fn complaint_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(complaint_id): Path<String>,
) -> Result<Response, HttpError> {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(views::not_found(ErrorMessage::ComplaintNotFound.to_string())),
        )
            .into_response()
    };

    let Ok(complaint_id) = Uuid::parse_str(&complaint_id) else {
        return Ok(not_found());
    };

    match app_state
        .complaint_service
        .complaint_for(&auth.user, complaint_id)
        .await
    {
        Ok(complaint) => Ok(Json(views::complaint_detail(&auth.user, complaint)).into_response()),
        Err(ServiceError::ComplaintNotFound(_)) => Ok(not_found()),
        Err(e) => Err(e.into()),
    }
}

pub async fn admin_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(params): Query<ComplaintQueryParams>,
) -> Result<impl IntoResponse, HttpError> {
    let selected = views::parse_status_filter(params.status.as_deref())?;
    let complaints = app_state
        .complaint_service
        .all_complaints(&auth.user, None)
        .await?;

    Ok(Json(views::admin_dashboard(&auth.user, &complaints, selected)))
}

pub async fn agent_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(params): Query<ComplaintQueryParams>,
) -> Result<impl IntoResponse, HttpError> {
    let selected = views::parse_status_filter(params.status.as_deref())?;
    let complaints = app_state
        .complaint_service
        .agent_complaints(&auth.user, None)
        .await?;

    Ok(Json(views::agent_dashboard(&auth.user, &complaints, selected)))
}
