//! Lecture catalog handler.

use crate::catalog::Lecture;
use crate::state::AppState;
use crate::web::error::ApiError;
use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

#[derive(Serialize)]
pub(super) struct LecturesResponse {
    lectures: Vec<Lecture>,
}

/// `GET /api/lectures` — the full catalog. Answers 500 when the lecture
/// table failed to load at startup.
pub(super) async fn list_lectures(
    State(state): State<AppState>,
) -> Result<Json<LecturesResponse>, ApiError> {
    if state.catalog.is_empty() {
        return Err(ApiError::internal("Lectures not loaded properly."));
    }
    Ok(Json(LecturesResponse {
        lectures: state.catalog.lectures().to_vec(),
    }))
}
