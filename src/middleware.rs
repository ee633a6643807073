//9
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorMessage, HttpError},
    models::usermodel::{Identity, UserRole},
    service::{
        gate::{self, GateDecision, Route},
        session::SessionState,
    },
    utils::token::{self, TOKEN_COOKIE},
    AppState,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddeware {
    pub user: Identity,
}

pub fn bearer_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(token::bearer_token)
}

/// Restores the session from the `token` cookie (or bearer header) and rejects the
/// request when nobody is logged in.
pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let bearer = bearer_from(req.headers());
    let token_provided = cookie_jar.get(TOKEN_COOKIE).is_some() || bearer.is_some();

    let mut session = app_state.session_store(cookie_jar, bearer);
    let user = match session.restore() {
        SessionState::Authenticated(identity) => identity.clone(),
        SessionState::Loading | SessionState::Anonymous => {
            let message = if token_provided {
                ErrorMessage::InvalidToken
            } else {
                ErrorMessage::TokenNotProvided
            };
            return Err(HttpError::unauthorized(message.to_string()));
        }
    };

    req.extensions_mut().insert(JWTAuthMiddeware { user });

    Ok(next.run(req).await)
}

pub async fn role_check(
    Extension(_app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let user = req
        .extensions()
        .get::<JWTAuthMiddeware>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;

    if !required_roles.contains(&user.user.role) {
        tracing::debug!("{} denied: requires one of {:?}", user.user.email, required_roles);
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    Ok(next.run(req).await)
}

/// Guards the view routes. Unlike `auth`, a missing session redirects instead of failing,
/// and public views still see who is logged in.
pub async fn page_gate(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let route = Route::parse(req.uri().path());
    let bearer = bearer_from(req.headers());

    let mut session = app_state.session_store(cookie_jar, bearer);
    session.restore();
    let state = session.state().clone();

    match gate::check(&state, &route) {
        GateDecision::Allow => {
            if let SessionState::Authenticated(user) = state {
                req.extensions_mut().insert(JWTAuthMiddeware { user });
            }
            next.run(req).await
        }
        GateDecision::RedirectToLogin { from } => {
            Redirect::to(&format!("/login?from={}", urlencoding::encode(&from))).into_response()
        }
        GateDecision::RedirectToDashboard => Redirect::to("/dashboard").into_response(),
        GateDecision::Pending => HttpError::new(
            "Session is still loading, please retry",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .into_response(),
    }
}
