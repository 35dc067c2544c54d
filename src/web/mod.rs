pub mod api;
pub mod error;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::web::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let state = Arc::new(state);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::build_api_routes(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
