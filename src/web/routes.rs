//! Web API router construction.

use crate::state::AppState;
use crate::web::{lectures, optimize, status};
use axum::Router;
use axum::routing::{get, post};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

/// Creates the web server router
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(status::health))
        .route("/lectures", get(lectures::list_lectures))
        .route("/optimize", post(optimize::submit))
        .route("/optimize/{task_id}", get(optimize::poll))
        .with_state(state);

    Router::new().nest("/api", api_router).layer((
        // The browser UI is served from a different origin.
        CorsLayer::permissive(),
        // Bounds request handling only; background optimization keeps
        // running past it.
        TimeoutLayer::new(Duration::from_secs(60)),
    ))
}
