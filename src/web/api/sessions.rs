use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use crate::auth::create_access_token;
use crate::locale::Locale;
use crate::locale::MessageKey;
use crate::service::error::ServiceError;
use crate::web::error::error_response;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /sessions
#[tracing::instrument(skip(state, req))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    Json(req): Json<LoginRequest>,
) -> Response {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return error_response(
            ServiceError::Validation {
                key: MessageKey::ValidationFailed,
            },
            locale,
        );
    };

    let user = match state.services.user.authenticate(&email, &password).await {
        Ok(user) => user,
        Err(e) => return error_response(e, locale),
    };

    let token = match create_access_token(
        user.id,
        &state.config.jwt_secret,
        state.config.token_ttl_secs,
    ) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Failed to create access token: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response();
        }
    };

    Json(json!({ "user": user, "token": token })).into_response()
}
