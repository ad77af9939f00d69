//! Timetable optimization core: schedule parsing, BQM compilation,
//! simulated annealing, and sample decoding.

pub mod anneal;
pub mod bqm;
pub mod candidates;
pub mod decode;
pub mod error;
pub mod prefs;
pub mod time;

pub use anneal::{Sampler, SampleSet, SimulatedAnnealer};
pub use bqm::{Bqm, Var, build_timetable_bqm};
pub use decode::{EnergyBreakdown, OptimizationOutcome, RankedSchedule};
pub use error::SolverError;
pub use prefs::Preferences;
