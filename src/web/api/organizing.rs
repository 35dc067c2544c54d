use std::sync::Arc;

use axum::Json;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;

use crate::locale::Locale;
use crate::web::api::meetups::TOTAL_COUNT_HEADER;
use crate::web::error::error_response;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
}

/// GET /organizing -- meetups organized by the authenticated user.
#[tracing::instrument(skip(state))]
pub async fn index(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Response {
    let page = query.page.unwrap_or(1).max(1);

    match state
        .services
        .meetup
        .list_organizing(user_id, page, state.config.page_size)
        .await
    {
        Ok((meetups, total)) => (
            StatusCode::OK,
            [(TOTAL_COUNT_HEADER, total.to_string())],
            Json(meetups),
        )
            .into_response(),
        Err(e) => error_response(e, locale),
    }
}
