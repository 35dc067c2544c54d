use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;

use crate::locale::Locale;
use crate::locale::MessageKey;
use crate::model::UserUpdate;
use crate::service::error::ServiceError;
use crate::service::user_service::NewUser;
use crate::web::error::error_response;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /users
#[tracing::instrument(skip(state, req))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    Json(req): Json<RegisterRequest>,
) -> Response {
    let (Some(name), Some(email), Some(password)) = (req.name, req.email, req.password) else {
        return error_response(
            ServiceError::Validation {
                key: MessageKey::ValidationFailed,
            },
            locale,
        );
    };

    match state
        .services
        .user
        .register(NewUser {
            name,
            email,
            password,
        })
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => error_response(e, locale),
    }
}

/// PUT /users
#[tracing::instrument(skip(state, fields))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    AuthUser(user_id): AuthUser,
    Json(fields): Json<UserUpdate>,
) -> Response {
    match state.services.user.update(user_id, fields).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => error_response(e, locale),
    }
}
