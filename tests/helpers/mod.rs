//! Shared fixtures for integration tests.

use ilram::catalog::{Catalog, Lecture};
use ilram::solver::anneal::{self, SimulatedAnnealer};
use ilram::solver::decode::{self, RankedSchedule, TOP_SCHEDULES};
use ilram::solver::prefs::Preferences;
use ilram::solver::{bqm, candidates};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;

/// Build a test lecture with its schedule string parsed.
pub fn lecture(id: &str, credit: f64, schedule: &str) -> Lecture {
    let (number, class_num) = id.split_once('-').unwrap_or((id, "1"));
    Lecture {
        id: id.to_owned(),
        number: number.to_owned(),
        class_num: class_num.to_owned(),
        name: format!("test lecture {id}"),
        credit,
        time_room: schedule.to_owned(),
        professor: "교수".to_owned(),
        category: "전공".to_owned(),
        time_slots: ilram::solver::time::parse_schedule(schedule),
    }
}

/// Preferences with the given ids marked mandatory, everything else default.
pub fn prefs_selecting(ids: &[&str]) -> Preferences {
    Preferences {
        mandatory_ids: ids.iter().map(|s| (*s).to_owned()).collect(),
        ..Preferences::default()
    }
}

/// Runs the full solver pipeline (candidates → BQM → annealing → decode)
/// with a fixed seed.
pub fn run_pipeline(catalog: &Catalog, prefs: &Preferences, seed: u64) -> Vec<RankedSchedule> {
    let mut rng = StdRng::seed_from_u64(seed);
    let pool = candidates::select_candidates(catalog, prefs, &mut rng).expect("candidate pool");
    let model = bqm::build_timetable_bqm(&pool, prefs, |_, _| {});
    let samples = anneal::sample_in_batches(
        &SimulatedAnnealer::default(),
        &model,
        prefs,
        &CancellationToken::new(),
        &mut rng,
        |_, _| {},
    )
    .expect("sampling");
    decode::decode_samples(&samples, &pool, prefs, TOP_SCHEDULES)
}

/// Lecture ids of one ranked schedule, sorted.
pub fn schedule_ids(schedule: &RankedSchedule) -> Vec<&str> {
    let mut ids: Vec<&str> = schedule.schedule.iter().map(|l| l.id.as_str()).collect();
    ids.sort_unstable();
    ids
}
