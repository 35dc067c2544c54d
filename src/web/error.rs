//! Translation of service errors into HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;

use crate::locale::Locale;
use crate::service::error::ServiceError;

/// One status per error kind, everywhere.
///
/// Temporal violations (past date, expired meetup) are client errors; only
/// token/credential problems map to 401, ownership problems to 403.
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation { .. }
        | ServiceError::PastDate { .. }
        | ServiceError::Expired { .. } => StatusCode::BAD_REQUEST,
        ServiceError::Auth { .. } => StatusCode::UNAUTHORIZED,
        ServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Conflict { .. } => StatusCode::CONFLICT,
        ServiceError::UnexpectedResult { .. } | ServiceError::DatabaseError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Recovers a service error at the request boundary as
/// `{"error": <localized message>}` with the status from [`status_for`].
pub fn error_response(err: ServiceError, locale: Locale) -> Response {
    let status = status_for(&err);

    let message = match err.key() {
        Some(key) => key.text(locale).to_string(),
        None => {
            log::error!("Request failed: {err}");
            "Internal server error".to_string()
        }
    };

    (status, Json(json!({ "error": message }))).into_response()
}
