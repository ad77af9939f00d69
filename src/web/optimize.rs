//! Optimization submission and polling handlers.

use crate::solver::prefs::Preferences;
use crate::state::AppState;
use crate::tasks::{TaskStatus, TaskView, worker};
use crate::web::error::ApiError;
use axum::extract::{Path, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Body of `POST /api/optimize`. The selected lecture ids become the
/// mandatory set; every preference field may be overridden alongside them.
#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub selected_lecture_ids: Vec<String>,
    #[serde(flatten)]
    pub preferences: Preferences,
}

#[derive(Serialize)]
pub(super) struct SubmitResponse {
    task_id: Uuid,
    status: TaskStatus,
}

/// `POST /api/optimize` — creates a task and hands it to a background
/// worker. Returns immediately with the task id.
pub(super) async fn submit(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    if request.selected_lecture_ids.is_empty() {
        return Err(ApiError::bad_request("No lectures selected."));
    }

    let mut prefs = request.preferences;
    prefs.mandatory_ids = request.selected_lecture_ids.into_iter().collect();

    let task_id = state.tasks.create(prefs.clone());
    info!(
        %task_id,
        mandatory = prefs.mandatory_ids.len(),
        target_credits = prefs.target_credits,
        "optimization task submitted"
    );
    worker::spawn(state, task_id, prefs);

    Ok(Json(SubmitResponse {
        task_id,
        status: TaskStatus::Pending,
    }))
}

/// `GET /api/optimize/{task_id}` — current status view of a task. Unknown
/// and malformed ids both answer 404.
pub(super) async fn poll(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskView>, ApiError> {
    Uuid::parse_str(&task_id)
        .ok()
        .and_then(|id| state.tasks.view(id))
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Task not found"))
}
