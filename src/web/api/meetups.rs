use std::sync::Arc;

use axum::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use chrono::DateTime;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::locale::Locale;
use crate::locale::MessageKey;
use crate::model::MeetupListOptBuilder;
use crate::model::MeetupUpdate;
use crate::service::error::ServiceError;
use crate::service::meetup_service::NewMeetup;
use crate::web::error::error_response;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StoreRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub banner_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub banner_id: Option<i64>,
}

/// GET /meetups
#[tracing::instrument(skip(state))]
pub async fn index(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    AuthUser(_user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Response {
    let day = match query.date.as_deref().map(parse_day).transpose() {
        Ok(day) => day,
        Err(e) => return error_response(e, locale),
    };

    let opts = match MeetupListOptBuilder::default()
        .day(day)
        .page(query.page.unwrap_or(1).max(1))
        .per_page(state.config.page_size)
        .build()
    {
        Ok(opts) => opts,
        Err(e) => {
            return error_response(
                ServiceError::UnexpectedResult {
                    message: e.to_string(),
                },
                locale,
            );
        }
    };

    match state.services.meetup.list(&opts).await {
        Ok((meetups, total)) => (
            StatusCode::OK,
            [(TOTAL_COUNT_HEADER, total.to_string())],
            Json(meetups),
        )
            .into_response(),
        Err(e) => error_response(e, locale),
    }
}

/// POST /meetups
#[tracing::instrument(skip(state, req))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    AuthUser(user_id): AuthUser,
    Json(req): Json<StoreRequest>,
) -> Response {
    let (Some(title), Some(description), Some(location), Some(date), Some(banner_id)) =
        (req.title, req.description, req.location, req.date, req.banner_id)
    else {
        return error_response(
            ServiceError::Validation {
                key: MessageKey::ValidationFailed,
            },
            locale,
        );
    };

    let date = match parse_datetime(&date) {
        Ok(date) => date,
        Err(e) => return error_response(e, locale),
    };

    let new_meetup = NewMeetup {
        title,
        description,
        location,
        date,
        banner_id,
    };

    match state.services.meetup.create(user_id, new_meetup).await {
        Ok(meetup) => (StatusCode::CREATED, Json(meetup)).into_response(),
        Err(e) => error_response(e, locale),
    }
}

/// PUT /meetups/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    AuthUser(user_id): AuthUser,
    Path(meetup_id): Path<i64>,
    Json(req): Json<UpdateRequest>,
) -> Response {
    let date = match req.date.as_deref().map(parse_datetime).transpose() {
        Ok(date) => date,
        Err(e) => return error_response(e, locale),
    };

    let fields = MeetupUpdate {
        title: req.title,
        description: req.description,
        location: req.location,
        date,
        banner_id: req.banner_id,
    };

    match state.services.meetup.update(user_id, meetup_id, fields).await {
        Ok(meetup) => Json(meetup).into_response(),
        Err(e) => error_response(e, locale),
    }
}

/// DELETE /meetups/{id}
#[tracing::instrument(skip(state))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    locale: Locale,
    AuthUser(user_id): AuthUser,
    Path(meetup_id): Path<i64>,
) -> Response {
    match state.services.meetup.delete(user_id, meetup_id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(e, locale),
    }
}

/// Parses the `date` listing filter: a plain `YYYY-MM-DD`, or any RFC 3339
/// timestamp whose UTC calendar day is taken.
fn parse_day(raw: &str) -> Result<NaiveDate, ServiceError> {
    if let Ok(day) = raw.parse::<NaiveDate>() {
        return Ok(day);
    }
    parse_datetime(raw).map(|dt| dt.date_naive())
}

fn parse_datetime(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, ServiceError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_utc())
        .map_err(|_| ServiceError::Validation {
            key: MessageKey::ValidationFailed,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_day_accepts_plain_dates_and_timestamps() {
        assert_eq!(
            parse_day("2026-08-07").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
        );
        assert_eq!(
            parse_day("2026-08-07T23:30:00-03:00").unwrap(),
            // 23:30 -03:00 is already the next day in UTC
            NaiveDate::from_ymd_opt(2026, 8, 8).unwrap()
        );
        assert!(parse_day("not-a-date").is_err());
    }

    #[test]
    fn parse_datetime_requires_rfc3339() {
        assert!(parse_datetime("2026-08-07T12:00:00Z").is_ok());
        assert!(parse_datetime("2026-08-07 12:00").is_err());
    }
}
