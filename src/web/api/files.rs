use std::sync::Arc;

use axum::Json;
use axum::extract::Multipart;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::locale::Locale;
use crate::locale::MessageKey;
use crate::service::error::ServiceError;
use crate::web::error::error_response;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// POST /files -- multipart banner upload.
#[tracing::instrument(skip(state, multipart))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    AuthUser(_user_id): AuthUser,
    mut multipart: Multipart,
) -> Response {
    let validation_failed = || {
        error_response(
            ServiceError::Validation {
                key: MessageKey::ValidationFailed,
            },
            locale,
        )
    };

    // First part carrying a filename wins; the original surface only ever
    // sends a single "file" part.
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return validation_failed(),
            Err(_) => return validation_failed(),
        };

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(_) => return validation_failed(),
        };

        return match state.services.file.store(&file_name, &bytes).await {
            Ok(file) => (StatusCode::CREATED, Json(file)).into_response(),
            Err(e) => error_response(e, locale),
        };
    }
}
