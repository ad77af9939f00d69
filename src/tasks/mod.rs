//! In-memory task table for optimization runs.
//!
//! The store is the only shared mutable state in the process. All mutation
//! goes through the typed transition methods, which hold a map shard lock
//! only for the update itself; the CPU-bound solver never computes under a
//! lock. Terminal states are frozen: a late update against a finished task
//! is logged and dropped.

pub mod worker;

use crate::solver::decode::OptimizationOutcome;
use crate::solver::prefs::Preferences;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// Lifecycle of one optimization task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Processing,
    Success,
    Failure,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }

    /// Legal transition relation. `Processing → Processing` carries progress
    /// updates; terminal states admit nothing.
    fn allows(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Processing)
                | (Processing, Success)
                | (Processing, Failure)
                | (Pending, Failure)
        )
    }
}

#[derive(Debug)]
struct TaskEntry {
    status: TaskStatus,
    summary: String,
    #[allow(dead_code)]
    preferences: Preferences,
    result: Option<OptimizationOutcome>,
    error: Option<String>,
    cancel: CancellationToken,
}

/// Client-facing snapshot of a task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub status: TaskStatus,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<OptimizationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Thread-safe registry of optimization tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    inner: Arc<DashMap<Uuid, TaskEntry>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh task in `PENDING`. Never blocks beyond the map
    /// insert.
    pub fn create(&self, preferences: Preferences) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.insert(
            id,
            TaskEntry {
                status: TaskStatus::Pending,
                summary: "Initializing...".to_owned(),
                preferences,
                result: None,
                error: None,
                cancel: CancellationToken::new(),
            },
        );
        debug!(task_id = %id, "task created");
        id
    }

    /// Moves a task into `PROCESSING` with an initial summary.
    pub fn start(&self, id: Uuid, summary: &str) {
        self.transition(id, TaskStatus::Processing, |entry| {
            entry.summary = summary.to_owned();
        });
    }

    /// Advances the summary of a running task.
    pub fn progress(&self, id: Uuid, summary: &str) {
        self.transition(id, TaskStatus::Processing, |entry| {
            entry.summary = summary.to_owned();
        });
    }

    /// Terminal success: records the result.
    pub fn succeed(&self, id: Uuid, outcome: OptimizationOutcome) {
        self.transition(id, TaskStatus::Success, |entry| {
            entry.summary = "Optimization complete".to_owned();
            entry.result = Some(outcome);
        });
    }

    /// Terminal failure: records the user-facing error string.
    pub fn fail(&self, id: Uuid, error: &str) {
        self.transition(id, TaskStatus::Failure, |entry| {
            entry.summary = "Optimization failed".to_owned();
            entry.error = Some(error.to_owned());
        });
    }

    /// Requests cancellation; the worker observes the token between
    /// sampling batches.
    pub fn cancel(&self, id: Uuid) {
        if let Some(entry) = self.inner.get(&id) {
            entry.cancel.cancel();
        }
    }

    /// The task's cancellation token, for handing to the worker.
    pub fn cancel_token(&self, id: Uuid) -> Option<CancellationToken> {
        self.inner.get(&id).map(|entry| entry.cancel.clone())
    }

    /// Snapshot of a task, or `None` for an unknown id.
    pub fn view(&self, id: Uuid) -> Option<TaskView> {
        self.inner.get(&id).map(|entry| TaskView {
            status: entry.status,
            summary: entry.summary.clone(),
            result: entry.result.clone(),
            error: entry.error.clone(),
        })
    }

    fn transition(&self, id: Uuid, next: TaskStatus, apply: impl FnOnce(&mut TaskEntry)) {
        let Some(mut entry) = self.inner.get_mut(&id) else {
            warn!(task_id = %id, ?next, "transition on unknown task");
            return;
        };
        if !entry.status.allows(next) {
            warn!(task_id = %id, from = ?entry.status, to = ?next, "illegal task transition dropped");
            return;
        }
        entry.status = next;
        apply(&mut entry);
    }
}
