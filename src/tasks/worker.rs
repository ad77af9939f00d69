//! Background optimization worker: candidate pool → BQM → annealing →
//! decoded schedules.
//!
//! One worker task runs per submitted optimization. The pipeline is
//! CPU-bound, so it executes on the blocking thread pool; status reads stay
//! responsive because the task table is only touched for short progress
//! updates. Errors never escape the worker — every failure path lands the
//! task in `FAILURE` with a readable message.

use crate::catalog::Catalog;
use crate::solver::anneal::{self, SimulatedAnnealer};
use crate::solver::bqm;
use crate::solver::candidates;
use crate::solver::decode::{self, OptimizationOutcome, TOP_SCHEDULES};
use crate::solver::error::SolverError;
use crate::solver::prefs::Preferences;
use crate::state::AppState;
use crate::tasks::TaskStore;
use crate::utils::fmt_duration;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Spawns the worker for a freshly created task.
pub fn spawn(state: AppState, task_id: Uuid, prefs: Preferences) {
    tokio::spawn(run(state, task_id, prefs));
}

/// Runs one optimization to completion and records the terminal state.
pub async fn run(state: AppState, task_id: Uuid, prefs: Preferences) {
    let tasks = state.tasks.clone();
    tasks.start(task_id, "Preparing candidate pool...");
    let started = Instant::now();

    match execute(state.catalog.clone(), tasks.clone(), task_id, prefs).await {
        Ok(outcome) => {
            info!(
                task_id = %task_id,
                duration = fmt_duration(started.elapsed()),
                schedules = outcome.top_schedules.len(),
                energy = outcome.energy,
                total_credits = outcome.total_credits,
                "optimization complete"
            );
            tasks.succeed(task_id, outcome);
        }
        Err(message) => {
            warn!(
                task_id = %task_id,
                duration = fmt_duration(started.elapsed()),
                error = %message,
                "optimization failed"
            );
            tasks.fail(task_id, &message);
        }
    }
}

async fn execute(
    catalog: Arc<Catalog>,
    tasks: TaskStore,
    task_id: Uuid,
    prefs: Preferences,
) -> Result<OptimizationOutcome, String> {
    let Some(cancel) = tasks.cancel_token(task_id) else {
        return Err("task record vanished before the worker started".to_owned());
    };

    let handle = tokio::task::spawn_blocking(move || -> Result<OptimizationOutcome, SolverError> {
        if prefs.use_quantum_annealing {
            return Err(SolverError::SamplerUnavailable(
                "no quantum hardware backend is configured".to_owned(),
            ));
        }

        // Per-task RNG from system entropy: concurrent tasks never share
        // random state.
        let mut rng = StdRng::from_os_rng();
        let pool = candidates::select_candidates(&catalog, &prefs, &mut rng)?;
        tasks.progress(
            task_id,
            &format!("Building BQM for {} candidate lectures...", pool.len()),
        );

        let model = bqm::build_timetable_bqm(&pool, &prefs, |msg, _pct| {
            tasks.progress(task_id, msg);
        });
        debug!(
            task_id = %task_id,
            variables = model.num_variables(),
            interactions = model.quadratic().len(),
            "BQM compiled"
        );

        tasks.progress(task_id, "Solving BQM with simulated annealing...");
        let sampler = SimulatedAnnealer::default();
        let samples = anneal::sample_in_batches(
            &sampler,
            &model,
            &prefs,
            &cancel,
            &mut rng,
            |msg, _pct| tasks.progress(task_id, msg),
        )?;

        tasks.progress(task_id, "Decoding sampled schedules...");
        let ranked = decode::decode_samples(&samples, &pool, &prefs, TOP_SCHEDULES);
        OptimizationOutcome::from_ranked(ranked).ok_or(SolverError::NoSchedules)
    });

    match handle.await {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(e)) => Err(e.to_string()),
        // A panic in the solver must not take the process down; it fails
        // the one task instead.
        Err(join_err) => Err(format!("optimization worker crashed: {join_err}")),
    }
}
