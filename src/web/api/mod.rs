pub mod files;
pub mod meetups;
pub mod organizing;
pub mod sessions;
pub mod subscriptions;
pub mod users;

use std::sync::Arc;

use axum::Router;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;

use crate::web::state::AppState;

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Public routes
        .route("/users", post(users::store).put(users::update))
        .route("/sessions", post(sessions::store))
        // Meetup registry
        .route("/meetups", get(meetups::index).post(meetups::store))
        .route("/meetups/{id}", put(meetups::update).delete(meetups::destroy))
        .route("/organizing", get(organizing::index))
        // Subscription ledger
        .route("/meetups/{id}/subscriptions", post(subscriptions::store))
        .route("/subscriptions", get(subscriptions::index))
        .route("/subscriptions/{id}", delete(subscriptions::destroy))
        // Banner uploads
        .route("/files", post(files::store))
        .with_state(state)
}
