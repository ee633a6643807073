//12
use std::sync::Arc;

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::{
    dtos::{FilterUserDto, LoginUserDto, RegisterUserDto, Response, UserData, UserLoginResponseDto, UserResponseDto},
    error::{ErrorMessage, HttpError},
    middleware::{auth, JWTAuthMiddeware},
    service::{error::ServiceError, session::RegisterProfile},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me).layer(middleware::from_fn(auth)))
}

/// Failures other than injected ones collapse into the generic message.
fn auth_failure(error: ServiceError, fallback: ErrorMessage) -> HttpError {
    match error {
        ServiceError::SimulatedFailure(_) => HttpError::from(error),
        other => {
            tracing::error!("Session error: {}", other);
            HttpError::server_error(fallback.to_string())
        }
    }
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    cookie_jar: CookieJar,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let mut session = app_state.session_store(cookie_jar, None);
    let identity = session
        .register(RegisterProfile {
            name: body.name,
            email: body.email,
        })
        .await
        .map_err(|e| auth_failure(e, ErrorMessage::RegistrationFailed))?;

    let storage = session.into_storage();
    let token = storage.issued_token().unwrap_or_default().to_string();

    Ok((
        storage.into_jar(),
        Json(UserLoginResponseDto {
            status: "success".to_string(),
            token,
            data: UserData {
                user: FilterUserDto::filter_user(&identity),
            },
        }),
    ))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    cookie_jar: CookieJar,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let mut session = app_state.session_store(cookie_jar, None);
    let identity = session
        .login(&body.email, &body.password)
        .await
        .map_err(|e| auth_failure(e, ErrorMessage::LoginFailed))?;

    if app_state.env.seed_fixtures && app_state.db_client.seed_if_empty().await {
        tracing::info!("Complaint store was empty, fixtures re-seeded on login");
    }

    let storage = session.into_storage();
    let token = storage.issued_token().unwrap_or_default().to_string();

    Ok((
        storage.into_jar(),
        Json(UserLoginResponseDto {
            status: "success".to_string(),
            token,
            data: UserData {
                user: FilterUserDto::filter_user(&identity),
            },
        }),
    ))
}

pub async fn logout(
    Extension(app_state): Extension<Arc<AppState>>,
    cookie_jar: CookieJar,
) -> impl IntoResponse {
    let mut session = app_state.session_store(cookie_jar, None);
    session.restore();
    session.logout();

    (
        session.into_storage().into_jar(),
        Json(Response {
            status: "success",
            message: "Logged out".to_string(),
        }),
    )
}

pub async fn me(
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&auth.user),
        },
    }))
}
