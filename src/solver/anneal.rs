//! Classical simulated annealing over binary quadratic models.
//!
//! The [`Sampler`] trait is the swap-in seam for alternative backends (a
//! remote annealer would implement it); the shipped implementation is the
//! [`SimulatedAnnealer`], a single-spin Metropolis sampler with a geometric
//! inverse-temperature schedule and independent chains per read.

use crate::solver::bqm::{Bqm, Var};
use crate::solver::error::SolverError;
use crate::solver::prefs::Preferences;
use rand::Rng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One total assignment with its energy under the sampled model. `values`
/// is parallel to the owning [`SampleSet`]'s variable list.
#[derive(Debug, Clone)]
pub struct Sample {
    pub values: Vec<bool>,
    pub energy: f64,
}

/// A batch of samples over a fixed variable order, kept sorted by ascending
/// energy.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    pub variables: Vec<Var>,
    pub samples: Vec<Sample>,
}

impl SampleSet {
    /// The lowest-energy sample, if any were drawn.
    pub fn lowest(&self) -> Option<&Sample> {
        self.samples.first()
    }
}

/// Low-energy sampler over a BQM.
pub trait Sampler: Send + Sync {
    /// Draws `num_reads` independent samples, returned in ascending energy
    /// order.
    fn sample(&self, bqm: &Bqm, num_reads: usize, rng: &mut StdRng) -> SampleSet;
}

/// Simulated annealing parameters.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealer {
    /// Full passes over the variables per read.
    pub num_sweeps: usize,
    /// Inverse-temperature endpoints; derived from the bias magnitudes when
    /// unset.
    pub beta_range: Option<(f64, f64)>,
}

impl Default for SimulatedAnnealer {
    fn default() -> Self {
        Self {
            num_sweeps: 1_000,
            beta_range: None,
        }
    }
}

/// Adjacency-indexed view of a BQM for O(degree) single-flip deltas.
struct IndexedModel {
    vars: Vec<Var>,
    linear: Vec<f64>,
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl IndexedModel {
    fn new(bqm: &Bqm) -> Self {
        let vars: Vec<Var> = bqm.variables().cloned().collect();
        let index = |var: &Var| vars.binary_search(var).expect("variable in roster");
        let linear: Vec<f64> = bqm.linear().values().copied().collect();
        let mut neighbors = vec![Vec::new(); vars.len()];
        for ((u, v), bias) in bqm.quadratic() {
            let (i, j) = (index(u), index(v));
            neighbors[i].push((j, *bias));
            neighbors[j].push((i, *bias));
        }
        Self {
            vars,
            linear,
            neighbors,
        }
    }

    /// Energy change from flipping variable `k` in `state`.
    fn flip_delta(&self, state: &[bool], k: usize) -> f64 {
        let field: f64 = self.linear[k]
            + self.neighbors[k]
                .iter()
                .filter(|(j, _)| state[*j])
                .map(|(_, bias)| bias)
                .sum::<f64>();
        if state[k] { -field } else { field }
    }

    fn energy(&self, state: &[bool]) -> f64 {
        let mut e: f64 = (0..state.len())
            .filter(|&i| state[i])
            .map(|i| self.linear[i])
            .sum();
        for i in 0..state.len() {
            if state[i] {
                // Each edge is stored on both endpoints; count it from the
                // lower index only.
                e += self.neighbors[i]
                    .iter()
                    .filter(|(j, _)| *j > i && state[*j])
                    .map(|(_, bias)| bias)
                    .sum::<f64>();
            }
        }
        e
    }

    /// Inverse-temperature endpoints derived from the bias magnitudes: hot
    /// enough to accept the steepest possible uphill move half the time,
    /// cold enough to reject a move of the smallest bias magnitude 99 times
    /// out of 100.
    fn default_beta_range(&self) -> (f64, f64) {
        let max_scale = (0..self.vars.len())
            .map(|i| {
                self.linear[i].abs()
                    + self.neighbors[i]
                        .iter()
                        .map(|(_, b)| b.abs())
                        .sum::<f64>()
            })
            .fold(0.0, f64::max);
        let min_bias = self
            .linear
            .iter()
            .map(|b| b.abs())
            .chain(
                self.neighbors
                    .iter()
                    .flat_map(|edges| edges.iter().map(|(_, b)| b.abs())),
            )
            .filter(|b| *b > 0.0)
            .fold(f64::INFINITY, f64::min);
        if max_scale <= 0.0 || !min_bias.is_finite() {
            return (0.1, 10.0);
        }
        let hot = 2f64.ln() / max_scale;
        let cold = (100f64.ln() / min_bias).max(hot * 2.0);
        (hot, cold)
    }
}

impl Sampler for SimulatedAnnealer {
    fn sample(&self, bqm: &Bqm, num_reads: usize, rng: &mut StdRng) -> SampleSet {
        let model = IndexedModel::new(bqm);
        let n = model.vars.len();
        if n == 0 {
            return SampleSet::default();
        }

        let (beta_hot, beta_cold) = self.beta_range.unwrap_or_else(|| model.default_beta_range());
        let sweeps = self.num_sweeps.max(1);
        // Geometric schedule from hot to cold.
        let ratio = (beta_cold / beta_hot).powf(1.0 / (sweeps.saturating_sub(1)).max(1) as f64);

        let mut samples = Vec::with_capacity(num_reads);
        for _ in 0..num_reads {
            let mut state: Vec<bool> = (0..n).map(|_| rng.random::<bool>()).collect();
            let mut beta = beta_hot;
            for _ in 0..sweeps {
                for k in 0..n {
                    let delta = model.flip_delta(&state, k);
                    if delta <= 0.0 || rng.random::<f64>() < (-beta * delta).exp() {
                        state[k] = !state[k];
                    }
                }
                beta *= ratio;
            }
            let energy = model.energy(&state);
            samples.push(Sample {
                values: state,
                energy,
            });
        }

        samples.sort_by(|a, b| a.energy.total_cmp(&b.energy));
        SampleSet {
            variables: model.vars,
            samples,
        }
    }
}

/// Runs the sampler in batches of `batch_size` reads until at least
/// `total_reads` samples are drawn, checking for task cancellation between
/// batches. The merged set is stably re-sorted by ascending energy, so ties
/// keep their draw order.
pub fn sample_in_batches(
    sampler: &dyn Sampler,
    bqm: &Bqm,
    prefs: &Preferences,
    cancel: &CancellationToken,
    rng: &mut StdRng,
    mut progress: impl FnMut(&str, u8),
) -> Result<SampleSet, SolverError> {
    let batch_size = prefs.batch_size.max(1);
    let batches = prefs.total_reads.div_ceil(batch_size).max(1);

    let mut merged = SampleSet::default();
    for batch in 0..batches {
        if cancel.is_cancelled() {
            return Err(SolverError::Cancelled);
        }
        let pct = (batch * 100 / batches) as u8;
        progress(
            &format!("Sampling batch {}/{batches}...", batch + 1),
            pct,
        );

        let set = sampler.sample(bqm, batch_size, rng);
        debug!(
            batch = batch + 1,
            batches,
            reads = set.samples.len(),
            lowest = set.lowest().map(|s| s.energy),
            "annealing batch complete"
        );
        if merged.variables.is_empty() {
            merged.variables = set.variables;
        }
        merged.samples.extend(set.samples);
    }

    merged.samples.sort_by(|a, b| a.energy.total_cmp(&b.energy));
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn lec(id: &str) -> Var {
        Var::Lecture(id.to_owned())
    }

    /// Two variables with a strong antiferromagnetic coupling: the ground
    /// state selects exactly the cheaper one.
    fn toy_bqm() -> Bqm {
        let mut bqm = Bqm::default();
        bqm.add_linear(lec("a"), -10.0);
        bqm.add_linear(lec("b"), -8.0);
        bqm.add_quadratic(lec("a"), lec("b"), 100.0);
        bqm
    }

    #[test]
    fn finds_the_ground_state_of_a_toy_model() {
        let mut rng = StdRng::seed_from_u64(42);
        let set = SimulatedAnnealer::default().sample(&toy_bqm(), 20, &mut rng);
        let best = set.lowest().unwrap();
        assert_eq!(best.energy, -10.0);
        let a = set.variables.iter().position(|v| *v == lec("a")).unwrap();
        let b = set.variables.iter().position(|v| *v == lec("b")).unwrap();
        assert!(best.values[a]);
        assert!(!best.values[b]);
    }

    #[test]
    fn samples_are_sorted_by_ascending_energy() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = SimulatedAnnealer::default().sample(&toy_bqm(), 30, &mut rng);
        assert_eq!(set.samples.len(), 30);
        for pair in set.samples.windows(2) {
            assert!(pair[0].energy <= pair[1].energy);
        }
    }

    #[test]
    fn empty_model_yields_an_empty_set() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = SimulatedAnnealer::default().sample(&Bqm::default(), 5, &mut rng);
        assert!(set.variables.is_empty());
        assert!(set.samples.is_empty());
    }

    #[test]
    fn driver_rounds_reads_up_to_whole_batches() {
        let mut rng = StdRng::seed_from_u64(9);
        let prefs = Preferences {
            total_reads: 25,
            batch_size: 10,
            ..Preferences::default()
        };
        let mut batches = Vec::new();
        let set = sample_in_batches(
            &SimulatedAnnealer::default(),
            &toy_bqm(),
            &prefs,
            &CancellationToken::new(),
            &mut rng,
            |msg, _| batches.push(msg.to_owned()),
        )
        .unwrap();
        assert_eq!(set.samples.len(), 30);
        assert_eq!(batches.len(), 3);
        for pair in set.samples.windows(2) {
            assert!(pair[0].energy <= pair[1].energy);
        }
    }

    #[test]
    fn driver_aborts_on_a_cancelled_token() {
        let mut rng = StdRng::seed_from_u64(9);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = sample_in_batches(
            &SimulatedAnnealer::default(),
            &toy_bqm(),
            &Preferences::default(),
            &cancel,
            &mut rng,
            |_, _| {},
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::Cancelled));
        assert_eq!(err.to_string(), "cancelled");
    }

    #[test]
    fn zero_batch_size_still_draws_one_batch() {
        let mut rng = StdRng::seed_from_u64(3);
        let prefs = Preferences {
            total_reads: 0,
            batch_size: 0,
            ..Preferences::default()
        };
        let set = sample_in_batches(
            &SimulatedAnnealer::default(),
            &toy_bqm(),
            &prefs,
            &CancellationToken::new(),
            &mut rng,
            |_, _| {},
        )
        .unwrap();
        assert_eq!(set.samples.len(), 1);
    }
}
