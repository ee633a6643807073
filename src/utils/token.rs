// src/utils/token.rs
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ErrorMessage, HttpError},
    models::usermodel::{Identity, UserRole},
    service::{error::ServiceError, session::IdentityStorage},
};

pub const TOKEN_COOKIE: &str = "token";

/// The whole identity travels in the token; there is no user table to look it up in.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    identity: &Identity,
    secret: &[u8],
    expires_in_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::minutes(expires_in_minutes)).timestamp().max(0) as usize;

    let claims = TokenClaims {
        sub: identity.id.to_string(),
        name: identity.name.clone(),
        email: identity.email.clone(),
        role: identity.role,
        iat,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<Identity, HttpError> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let claims = decoded.claims;
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    Ok(Identity::new(id, claims.name, claims.email, claims.role))
}

/// Session storage backed by the `token` cookie, falling back to a bearer header.
#[derive(Debug, Clone)]
pub struct TokenCookieStorage {
    jar: CookieJar,
    bearer: Option<String>,
    secret: String,
    maxage: i64,
    issued: Option<String>,
}

impl TokenCookieStorage {
    pub fn new(jar: CookieJar, bearer: Option<String>, secret: impl Into<String>, maxage: i64) -> Self {
        TokenCookieStorage {
            jar,
            bearer,
            secret: secret.into(),
            maxage,
            issued: None,
        }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }

    /// Token minted by the last successful `save`.
    pub fn issued_token(&self) -> Option<&str> {
        self.issued.as_deref()
    }

    fn presented_token(&self) -> Option<String> {
        self.jar
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| self.bearer.clone())
    }
}

impl IdentityStorage for TokenCookieStorage {
    fn load(&self) -> Option<Identity> {
        let token = self.presented_token()?;
        match decode_token(token, self.secret.as_bytes()) {
            Ok(identity) => Some(identity),
            Err(_) => {
                tracing::debug!("Ignoring invalid session token");
                None
            }
        }
    }

    fn save(&mut self, identity: &Identity) -> Result<(), ServiceError> {
        let token = create_token(identity, self.secret.as_bytes(), self.maxage)
            .map_err(|e| ServiceError::Other(e.to_string()))?;

        let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
            .path("/")
            .max_age(time::Duration::minutes(self.maxage))
            .http_only(true);

        self.jar = self.jar.clone().add(cookie);
        self.issued = Some(token);
        Ok(())
    }

    fn clear(&mut self) {
        self.jar = self.jar.clone().remove(Cookie::build(TOKEN_COOKIE).path("/"));
        self.bearer = None;
        self.issued = None;
    }
}

/// Extracts the token from an `Authorization: Bearer ...` header value.
pub fn bearer_token(header_value: &str) -> Option<String> {
    header_value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn token_carries_the_identity() {
        let agent = fixtures::agent();
        let token = create_token(&agent, SECRET, 60).unwrap();

        assert_eq!(decode_token(token, SECRET).unwrap(), agent);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(&fixtures::admin(), SECRET, 60).unwrap();
        let err = decode_token(token, b"other-secret").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token(&fixtures::john(), SECRET, -5).unwrap();
        assert!(decode_token(token, SECRET).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_token("not-a-token", SECRET).is_err());
    }

    #[test]
    fn storage_round_trips_through_cookie() {
        let john = fixtures::john();
        let mut storage = TokenCookieStorage::new(CookieJar::new(), None, "test-secret", 60);
        assert!(storage.load().is_none());

        storage.save(&john).unwrap();
        assert!(storage.issued_token().is_some());
        assert_eq!(storage.load(), Some(john));

        storage.clear();
        assert!(storage.load().is_none());
    }

    #[test]
    fn storage_falls_back_to_bearer() {
        let admin = fixtures::admin();
        let token = create_token(&admin, SECRET, 60).unwrap();
        let storage = TokenCookieStorage::new(CookieJar::new(), Some(token), "test-secret", 60);

        assert_eq!(storage.load(), Some(admin));
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc".to_string()));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
