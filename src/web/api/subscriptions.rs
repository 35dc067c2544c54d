use std::sync::Arc;

use axum::Json;
use axum::extract::Path;
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

/// POST /meetups/{id}/subscriptions
#[tracing::instrument(skip(state))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    AuthUser(user_id): AuthUser,
    Path(meetup_id): Path<i64>,
) -> Response {
    match state.services.subscription.create(user_id, meetup_id).await {
        Ok(subscription) => (StatusCode::CREATED, Json(subscription)).into_response(),
        Err(e) => error_response(e, locale),
    }
}

/// GET /subscriptions
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
        .subscription
        .list(user_id, page, state.config.page_size)
        .await
    {
        Ok((subscriptions, total)) => (
            StatusCode::OK,
            [(TOTAL_COUNT_HEADER, total.to_string())],
            Json(subscriptions),
        )
            .into_response(),
        Err(e) => error_response(e, locale),
    }
}

/// DELETE /subscriptions/{id}
#[tracing::instrument(skip(state))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    AuthUser(user_id): AuthUser,
    Path(subscription_id): Path<i64>,
) -> Response {
    match state
        .services
        .subscription
        .delete(user_id, subscription_id)
        .await
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(e, locale),
    }
}
