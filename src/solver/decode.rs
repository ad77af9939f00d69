//! Sample decoding: project low-energy assignments onto concrete schedules,
//! deduplicate, and re-score each one into a named energy breakdown.
//!
//! The breakdown is an independent re-derivation of the sample energy and
//! doubles as an oracle check on the compiler. The only intentional
//! difference is the target-credit term: the compiler carries the expanded
//! square (which drops the constant `w·K²`), while the scorer uses the
//! closed form `w·(Σc − K)²`. For every sample,
//! `energy − breakdown_total = −w_target_credit · target_credits²`.

use crate::catalog::Lecture;
use crate::solver::anneal::SampleSet;
use crate::solver::bqm::{self, Var};
use crate::solver::prefs::Preferences;
use crate::solver::time::Day;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// How many unique schedules the decoder keeps.
pub const TOP_SCHEDULES: usize = 5;

/// Named energy contributions of one schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnergyBreakdown {
    pub credit_penalty: f64,
    pub mandatory_reward: f64,
    #[serde(rename = "1st_period_penalty")]
    pub first_period_penalty: f64,
    pub lunch_overlap_penalty: f64,
    pub time_credit_mismatch_penalty: f64,
    pub free_day_reward: f64,
    pub overlap_penalty: f64,
    pub contiguous_reward: f64,
    pub tension_penalty: f64,
}

impl EnergyBreakdown {
    /// Sum of all contributions.
    pub fn total(&self) -> f64 {
        self.credit_penalty
            + self.mandatory_reward
            + self.first_period_penalty
            + self.lunch_overlap_penalty
            + self.time_credit_mismatch_penalty
            + self.free_day_reward
            + self.overlap_penalty
            + self.contiguous_reward
            + self.tension_penalty
    }
}

/// One decoded schedule, ranked by sample energy.
#[derive(Debug, Clone, Serialize)]
pub struct RankedSchedule {
    pub schedule: Vec<Lecture>,
    pub free_days: Vec<Day>,
    pub energy: f64,
    pub total_credits: f64,
    pub breakdown: EnergyBreakdown,
}

/// Final result payload of a successful optimization: the best schedule
/// mirrored at the top level plus the full ranked list.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationOutcome {
    pub schedule: Vec<Lecture>,
    pub free_days: Vec<Day>,
    pub energy: f64,
    pub total_credits: f64,
    pub breakdown: EnergyBreakdown,
    pub top_schedules: Vec<RankedSchedule>,
}

impl OptimizationOutcome {
    /// Wraps a non-empty ranked list, mirroring its head at the top level.
    pub fn from_ranked(top_schedules: Vec<RankedSchedule>) -> Option<Self> {
        let best = top_schedules.first()?;
        Some(Self {
            schedule: best.schedule.clone(),
            free_days: best.free_days.clone(),
            energy: best.energy,
            total_credits: best.total_credits,
            breakdown: best.breakdown.clone(),
            top_schedules,
        })
    }
}

/// Walks the sample stream in ascending energy order and collects up to
/// `limit` unique non-empty schedules. Uniqueness is by the set of selected
/// lecture ids; energy ties keep their sample order.
pub fn decode_samples(
    set: &SampleSet,
    lectures: &[Lecture],
    prefs: &Preferences,
    limit: usize,
) -> Vec<RankedSchedule> {
    let by_id: HashMap<&str, &Lecture> = lectures.iter().map(|l| (l.id.as_str(), l)).collect();
    let mut seen: HashSet<BTreeSet<String>> = HashSet::new();
    let mut ranked = Vec::new();

    for sample in &set.samples {
        let mut selected: Vec<&Lecture> = Vec::new();
        let mut free_days: Vec<Day> = Vec::new();
        for (var, on) in set.variables.iter().zip(&sample.values) {
            if !on {
                continue;
            }
            match var {
                Var::Lecture(id) => {
                    if let Some(lec) = by_id.get(id.as_str()).copied() {
                        selected.push(lec);
                    }
                }
                Var::FreeDay(day) => free_days.push(*day),
            }
        }
        if selected.is_empty() {
            continue;
        }

        let signature: BTreeSet<String> = selected.iter().map(|l| l.id.clone()).collect();
        if !seen.insert(signature) {
            continue;
        }

        let breakdown = score_schedule(&selected, &free_days, prefs);
        ranked.push(RankedSchedule {
            schedule: selected.iter().map(|l| (*l).clone()).collect(),
            free_days,
            energy: sample.energy,
            total_credits: selected.iter().map(|l| l.credit).sum(),
            breakdown,
        });
        if ranked.len() == limit {
            break;
        }
    }

    ranked
}

/// Re-scores a schedule from scratch, mirroring every compiler term except
/// the target-credit square, which is evaluated in closed form.
pub fn score_schedule(
    selected: &[&Lecture],
    free_days: &[Day],
    prefs: &Preferences,
) -> EnergyBreakdown {
    let mut b = EnergyBreakdown::default();

    let total_credits: f64 = selected.iter().map(|l| l.credit).sum();
    let deviation = total_credits - prefs.target_credits;
    b.credit_penalty = prefs.w_target_credit * deviation * deviation;

    let mandatory = selected
        .iter()
        .filter(|l| prefs.mandatory_ids.contains(&l.id))
        .count();
    b.mandatory_reward = prefs.w_mandatory * mandatory as f64;

    for lec in selected {
        for slot in &lec.time_slots {
            if bqm::is_first_period(slot.start) {
                b.first_period_penalty += prefs.w_first_class;
            }
            if bqm::in_lunch_window(slot.start, slot.end) {
                b.lunch_overlap_penalty += prefs.w_lunch_overlap;
            }
        }
        b.time_credit_mismatch_penalty += prefs.w_time_credit_ratio * bqm::excess_hours(lec);
    }

    // Mirrors the compiler's free-day coupling: the day reward, plus the
    // break penalty once per selected lecture meeting on that day.
    for day in free_days {
        b.free_day_reward -= prefs.r_free_day;
        let broken = selected
            .iter()
            .filter(|l| l.time_slots.iter().any(|s| s.day == *day))
            .count();
        b.free_day_reward += prefs.p_free_day_break * broken as f64;
    }

    // Same per-day occurrence roster as the compiler, restricted to the
    // selected lectures.
    let owned: Vec<Lecture> = selected.iter().map(|l| (*l).clone()).collect();
    for (day, entries) in bqm::day_roster(&owned) {
        for (i, a) in entries.iter().enumerate() {
            for x in &entries[i + 1..] {
                if a.id == x.id {
                    continue;
                }
                let term = bqm::pair_term(bqm::day_interaction(a, x, day));
                match term {
                    bqm::PairTerm::Overlap => b.overlap_penalty += term.bias(prefs),
                    bqm::PairTerm::Contiguous => b.contiguous_reward += term.bias(prefs),
                    bqm::PairTerm::Tension(_) => b.tension_penalty += term.bias(prefs),
                    bqm::PairTerm::Independent => {}
                }
            }
        }
    }

    b
}
