//! Request extractors: bearer authentication and locale negotiation.

use std::sync::Arc;

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header;
use axum::http::request::Parts;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;

use crate::auth::validate_access_token;
use crate::locale::Locale;
use crate::locale::MessageKey;
use crate::web::state::AppState;

/// Extractor that validates a JWT Bearer token and provides the caller's
/// user id. Use it directly for required auth.
#[derive(Debug)]
pub struct AuthUser(pub i64);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let locale = locale_from_parts(parts);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(val) => match val.strip_prefix("Bearer ") {
                Some(t) => t,
                None => return Err(reject(StatusCode::UNAUTHORIZED, MessageKey::TokenInvalid, locale)),
            },
            None => return Err(reject(StatusCode::UNAUTHORIZED, MessageKey::TokenMissing, locale)),
        };

        let claims = match validate_access_token(token, &state.config.jwt_secret) {
            Ok(claims) => claims,
            Err(_) => return Err(reject(StatusCode::UNAUTHORIZED, MessageKey::TokenInvalid, locale)),
        };

        match claims.user_id() {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => Err(reject(StatusCode::UNAUTHORIZED, MessageKey::TokenInvalid, locale)),
        }
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(locale_from_parts(parts))
    }
}

fn locale_from_parts(parts: &Parts) -> Locale {
    Locale::negotiate(
        parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok()),
    )
}

fn reject(status: StatusCode, key: MessageKey, locale: Locale) -> Response {
    (status, Json(json!({ "error": key.text(locale) }))).into_response()
}
