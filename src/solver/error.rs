//! Error types for the optimization pipeline.

/// Failures inside the optimization worker. Each variant's display string
/// becomes the task's user-facing `error` field.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("none of the selected lectures were found in the catalog")]
    NoCandidates,
    #[error("sampling produced no non-empty schedule")]
    NoSchedules,
    #[error("sampler backend unavailable: {0}")]
    SamplerUnavailable(String),
    #[error("cancelled")]
    Cancelled,
}
