//! Optimization preferences: target load, sampling budget, and the weight
//! vector driving the objective.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tunables for one optimization run.
///
/// Every field has a default, so a request may override any subset. All
/// weights are energy contributions: positive values penalize, negative
/// values reward, and the solver minimizes total energy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Desired total credit load; deviation is penalized quadratically.
    pub target_credits: f64,
    /// Lecture ids whose inclusion is strongly rewarded.
    pub mandatory_ids: BTreeSet<String>,
    /// Cap on the number of lectures fed to the compiler. Mandatory lectures
    /// always make the pool, even past the cap.
    pub max_candidates: usize,
    /// Total annealing reads across all batches.
    pub total_reads: usize,
    /// Reads per batch; cancellation is checked between batches.
    pub batch_size: usize,
    /// Route the problem to quantum hardware instead of the local annealer.
    /// No hardware backend ships with this service, so enabling this fails
    /// the task with a sampler-unavailable error.
    pub use_quantum_annealing: bool,
    /// Penalty for selecting two lectures whose meeting times overlap.
    pub w_hard_overlap: f64,
    /// Scale of the quadratic deviation from `target_credits`.
    pub w_target_credit: f64,
    /// Reward (negative) added to each mandatory lecture.
    pub w_mandatory: f64,
    /// Penalty per interval starting at or before 09:30.
    pub w_first_class: f64,
    /// Penalty per interval intersecting the 12:00-13:00 lunch window.
    pub w_lunch_overlap: f64,
    /// Reward (as a positive magnitude) for keeping a day free of classes.
    pub r_free_day: f64,
    /// Penalty for pairing a free-day marker with a class on that day.
    pub p_free_day_break: f64,
    /// Reward (negative) for same-day pairs at most an hour apart.
    pub w_contiguous_reward: f64,
    /// Scale of the `√gap` penalty for awkward 1-3 hour same-day gaps.
    pub w_tension_base: f64,
    /// Penalty per class hour in excess of the lecture's credit value.
    pub w_time_credit_ratio: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            target_credits: 21.0,
            mandatory_ids: BTreeSet::new(),
            max_candidates: 300,
            total_reads: 100,
            batch_size: 100,
            use_quantum_annealing: false,
            w_hard_overlap: 10_000.0,
            w_target_credit: 100.0,
            w_mandatory: -10_000.0,
            w_first_class: 50.0,
            w_lunch_overlap: 30.0,
            r_free_day: 100.0,
            p_free_day_break: 500.0,
            w_contiguous_reward: -20.0,
            w_tension_base: 5.0,
            w_time_credit_ratio: 50.0,
        }
    }
}
