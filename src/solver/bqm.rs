//! Binary quadratic model construction for timetable selection.
//!
//! The compiler turns a candidate lecture pool plus a weight vector into a
//! QUBO objective over binary selection variables (one per lecture) and
//! per-day free-day auxiliaries. Lower energy means a better schedule.
//!
//! The target-credit constraint is compiled in expanded form,
//! `w·(c_i² − 2K·c_i)` on the diagonal plus `w·2·c_i·c_j` on every pair,
//! which equals `w·(Σc_i·x_i − K)²` minus the constant `w·K²`. The decoder
//! re-scores with the closed form, so the two paths disagree by exactly that
//! constant (see `decode`).

use crate::catalog::Lecture;
use crate::solver::prefs::Preferences;
use crate::solver::time::{self, Day};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lectures starting at or before 09:30 take the first-period penalty.
const FIRST_PERIOD_CUTOFF: u16 = 570;
/// Lunch window, minutes from midnight (12:00-13:00).
const LUNCH_START: u16 = 720;
const LUNCH_END: u16 = 780;
/// Same-day gaps up to an hour count as contiguous (rewarded).
const CONTIGUOUS_MAX_GAP: u16 = 60;
/// Same-day gaps up to three hours count as tension (penalized); beyond
/// that the pair is treated as independent.
const TENSION_MAX_GAP: u16 = 180;

/// A binary decision variable of the model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Var {
    /// Selection variable for one lecture, keyed by lecture id.
    Lecture(String),
    /// Auxiliary variable meaning "this day has no classes".
    FreeDay(Day),
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Var::Lecture(id) => f.write_str(id),
            Var::FreeDay(day) => write!(f, "free_{day}"),
        }
    }
}

/// Binary quadratic model `E(x) = Σ L_i·x_i + Σ Q_ij·x_i·x_j` with
/// `x_i ∈ {0, 1}`.
///
/// Quadratic keys are unordered pairs of distinct variables, stored in
/// canonical (sorted) order. Repeated contributions to the same variable or
/// pair accumulate by addition. Ordered maps keep iteration deterministic,
/// so identical inputs always produce an identical model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bqm {
    linear: BTreeMap<Var, f64>,
    quadratic: BTreeMap<(Var, Var), f64>,
}

impl Bqm {
    /// Adds `bias` to the linear term of `var`, creating it at zero first.
    pub fn add_linear(&mut self, var: Var, bias: f64) {
        *self.linear.entry(var).or_insert(0.0) += bias;
    }

    /// Adds `bias` to the quadratic term of the unordered pair `{u, v}`,
    /// registering both endpoints with a zero linear entry if new.
    ///
    /// Self-interactions are undefined on a BQM; callers must pass distinct
    /// variables.
    pub fn add_quadratic(&mut self, u: Var, v: Var, bias: f64) {
        debug_assert_ne!(u, v, "self-interaction on a BQM variable");
        self.linear.entry(u.clone()).or_insert(0.0);
        self.linear.entry(v.clone()).or_insert(0.0);
        let key = if u <= v { (u, v) } else { (v, u) };
        *self.quadratic.entry(key).or_insert(0.0) += bias;
    }

    pub fn linear(&self) -> &BTreeMap<Var, f64> {
        &self.linear
    }

    pub fn quadratic(&self) -> &BTreeMap<(Var, Var), f64> {
        &self.quadratic
    }

    /// All variables of the model, in canonical order. Every variable carries
    /// a linear entry (possibly zero), so the linear map is the full roster.
    pub fn variables(&self) -> impl Iterator<Item = &Var> {
        self.linear.keys()
    }

    pub fn num_variables(&self) -> usize {
        self.linear.len()
    }

    /// Evaluates the objective for a total assignment.
    pub fn energy(&self, value: impl Fn(&Var) -> bool) -> f64 {
        let linear: f64 = self
            .linear
            .iter()
            .filter(|(var, _)| value(var))
            .map(|(_, bias)| bias)
            .sum();
        let quadratic: f64 = self
            .quadratic
            .iter()
            .filter(|((u, v), _)| value(u) && value(v))
            .map(|(_, bias)| bias)
            .sum();
        linear + quadratic
    }
}

/// How two lectures relate on one shared day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayInteraction {
    /// Meeting times collide on this day.
    Overlap,
    /// No collision; minimum idle gap in minutes between the two on this day.
    Gap(u16),
}

/// Classifies a lecture pair on one day. Both the overlap predicate and the
/// gap are restricted to that day's intervals.
pub(crate) fn day_interaction(a: &Lecture, b: &Lecture, day: Day) -> DayInteraction {
    if time::overlaps_on(&a.time_slots, &b.time_slots, day) {
        DayInteraction::Overlap
    } else {
        DayInteraction::Gap(time::gap_on(&a.time_slots, &b.time_slots, day))
    }
}

/// Objective term a same-day pair contributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PairTerm {
    /// `w_hard_overlap`: the two collide.
    Overlap,
    /// `w_contiguous_reward`: back-to-back within an hour.
    Contiguous,
    /// `w_tension_base · √gap` for an awkward 1-3 hour gap.
    Tension(f64),
    /// Far enough apart to carry no term.
    Independent,
}

impl PairTerm {
    pub(crate) fn bias(self, prefs: &Preferences) -> f64 {
        match self {
            PairTerm::Overlap => prefs.w_hard_overlap,
            PairTerm::Contiguous => prefs.w_contiguous_reward,
            PairTerm::Tension(scale) => prefs.w_tension_base * scale,
            PairTerm::Independent => 0.0,
        }
    }
}

/// Classifies the objective term for a lecture pair on one day.
pub(crate) fn pair_term(interaction: DayInteraction) -> PairTerm {
    match interaction {
        DayInteraction::Overlap => PairTerm::Overlap,
        DayInteraction::Gap(g) if g > 0 && g <= CONTIGUOUS_MAX_GAP => PairTerm::Contiguous,
        DayInteraction::Gap(g) if g > CONTIGUOUS_MAX_GAP && g <= TENSION_MAX_GAP => {
            PairTerm::Tension(f64::from(g).sqrt())
        }
        DayInteraction::Gap(_) => PairTerm::Independent,
    }
}

/// Per-day roster of the pool: one entry per interval occurrence, so a
/// lecture meeting twice on a day appears twice on that day's list.
pub(crate) fn day_roster<'a>(lectures: &'a [Lecture]) -> BTreeMap<Day, Vec<&'a Lecture>> {
    let mut roster: BTreeMap<Day, Vec<&Lecture>> = BTreeMap::new();
    for lec in lectures {
        for slot in &lec.time_slots {
            roster.entry(slot.day).or_default().push(lec);
        }
    }
    roster
}

/// Whether an interval intersects the lunch window.
pub(crate) fn in_lunch_window(start: u16, end: u16) -> bool {
    start.max(LUNCH_START) < end.min(LUNCH_END)
}

/// Whether an interval takes the first-period penalty.
pub(crate) fn is_first_period(start: u16) -> bool {
    start <= FIRST_PERIOD_CUTOFF
}

/// Class hours in excess of the credit value, zero when within budget.
pub(crate) fn excess_hours(lec: &Lecture) -> f64 {
    let hours = f64::from(time::total_minutes(&lec.time_slots)) / 60.0;
    (hours - lec.credit).max(0.0)
}

/// Compiles the candidate pool into a BQM.
///
/// `progress` receives milestone descriptions with an advisory percentage;
/// it exists for task status reporting only and has no effect on the model.
pub fn build_timetable_bqm(
    lectures: &[Lecture],
    prefs: &Preferences,
    mut progress: impl FnMut(&str, u8),
) -> Bqm {
    let mut bqm = Bqm::default();

    progress("Analyzing lectures and linear biases...", 10);
    for lec in lectures {
        let var = Var::Lecture(lec.id.clone());

        // Diagonal of the expanded target-credit square.
        bqm.add_linear(
            var.clone(),
            prefs.w_target_credit * (lec.credit * lec.credit - 2.0 * prefs.target_credits * lec.credit),
        );

        if prefs.mandatory_ids.contains(&lec.id) {
            bqm.add_linear(var.clone(), prefs.w_mandatory);
        }

        for slot in &lec.time_slots {
            if is_first_period(slot.start) {
                bqm.add_linear(var.clone(), prefs.w_first_class);
            }
            if in_lunch_window(slot.start, slot.end) {
                bqm.add_linear(var.clone(), prefs.w_lunch_overlap);
            }
        }

        let excess = excess_hours(lec);
        if excess > 0.0 {
            bqm.add_linear(var, prefs.w_time_credit_ratio * excess);
        }
    }

    progress("Calculating credit interaction terms...", 30);
    for (i, a) in lectures.iter().enumerate() {
        for b in &lectures[i + 1..] {
            if a.id == b.id {
                continue;
            }
            bqm.add_quadratic(
                Var::Lecture(a.id.clone()),
                Var::Lecture(b.id.clone()),
                prefs.w_target_credit * 2.0 * a.credit * b.credit,
            );
        }
    }

    progress("Checking time overlaps and tension models...", 60);
    let roster = day_roster(lectures);
    for (day_idx, day) in Day::ALL.iter().enumerate() {
        if let Some(entries) = roster.get(day) {
            let y = Var::FreeDay(*day);
            bqm.add_linear(y.clone(), -prefs.r_free_day);

            // Couple each distinct lecture on this day to the auxiliary once,
            // regardless of how many intervals it has here.
            let mut coupled: BTreeSet<&str> = BTreeSet::new();
            for lec in entries {
                if coupled.insert(lec.id.as_str()) {
                    bqm.add_quadratic(
                        Var::Lecture(lec.id.clone()),
                        y.clone(),
                        prefs.p_free_day_break,
                    );
                }
            }

            for (i, a) in entries.iter().enumerate() {
                for b in &entries[i + 1..] {
                    // A lecture meeting twice on one day must not pair with
                    // itself; distinct-pair duplicates accumulate as usual.
                    if a.id == b.id {
                        continue;
                    }
                    let bias = pair_term(day_interaction(a, b, *day)).bias(prefs);
                    if bias != 0.0 {
                        bqm.add_quadratic(
                            Var::Lecture(a.id.clone()),
                            Var::Lecture(b.id.clone()),
                            bias,
                        );
                    }
                }
            }
        }

        let pct = (60 + (day_idx + 1) * 30 / 7) as u8;
        progress(&format!("Analyzing day {day} ({}/7)...", day_idx + 1), pct);
    }

    progress("Finalizing BQM...", 95);
    bqm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Lecture;
    use crate::solver::time::parse_schedule;

    fn lecture(id: &str, credit: f64, schedule: &str) -> Lecture {
        Lecture {
            id: id.to_owned(),
            number: id.to_owned(),
            class_num: "1".to_owned(),
            name: format!("lecture {id}"),
            credit,
            time_room: schedule.to_owned(),
            professor: String::new(),
            category: String::new(),
            time_slots: parse_schedule(schedule),
        }
    }

    fn lec_var(id: &str) -> Var {
        Var::Lecture(id.to_owned())
    }

    fn no_progress(_: &str, _: u8) {}

    #[test]
    fn identical_inputs_build_identical_models() {
        let pool = vec![
            lecture("A-1", 3.0, "월 09:00-10:30 수 09:00(90)"),
            lecture("B-1", 2.0, "월 10:30-12:30"),
        ];
        let prefs = Preferences::default();
        let one = build_timetable_bqm(&pool, &prefs, no_progress);
        let two = build_timetable_bqm(&pool, &prefs, no_progress);
        assert_eq!(one, two);
    }

    #[test]
    fn target_credit_terms_expand_the_square() {
        let pool = vec![
            lecture("A-1", 3.0, "월 14:00(60)"),
            lecture("B-1", 2.0, "화 14:00(60)"),
        ];
        let prefs = Preferences {
            target_credits: 6.0,
            ..Preferences::default()
        };
        let bqm = build_timetable_bqm(&pool, &prefs, no_progress);

        // Diagonal: w·(c² − 2Kc); cross: w·2·c_a·c_b.
        let a = bqm.linear()[&lec_var("A-1")];
        assert_eq!(a, 100.0 * (9.0 - 2.0 * 6.0 * 3.0));
        let cross = bqm.quadratic()[&(lec_var("A-1"), lec_var("B-1"))];
        assert_eq!(cross, 100.0 * 2.0 * 3.0 * 2.0);
    }

    #[test]
    fn mandatory_first_period_and_lunch_fold_into_linear_bias() {
        let pool = vec![lecture("A-1", 3.0, "월 09:00(60) 수 11:30-12:30")];
        let prefs = Preferences {
            target_credits: 3.0,
            mandatory_ids: ["A-1".to_owned()].into(),
            ..Preferences::default()
        };
        let bqm = build_timetable_bqm(&pool, &prefs, no_progress);

        // credit diagonal w·(9 − 18) = −900, mandatory −10000, first period
        // (09:00 start) +50, lunch (12:00-12:30 intersection) +30.
        let bias = bqm.linear()[&lec_var("A-1")];
        assert_eq!(bias, -900.0 - 10_000.0 + 50.0 + 30.0);
    }

    #[test]
    fn excess_class_hours_are_penalized() {
        // 3 hours of class for 2 credits: one excess hour.
        let pool = vec![lecture("A-1", 2.0, "금 13:00-16:00")];
        let prefs = Preferences {
            target_credits: 2.0,
            ..Preferences::default()
        };
        let bqm = build_timetable_bqm(&pool, &prefs, no_progress);
        let bias = bqm.linear()[&lec_var("A-1")];
        // credit diagonal w·(4 − 8) = −400, plus 50 per excess hour.
        assert_eq!(bias, -400.0 + 50.0);
    }

    #[test]
    fn overlapping_pairs_take_the_hard_penalty() {
        let pool = vec![
            lecture("A-1", 3.0, "월 10:00-11:30"),
            lecture("B-1", 3.0, "월 10:30-12:00"),
        ];
        let bqm = build_timetable_bqm(&pool, &Preferences::default(), no_progress);
        let q = bqm.quadratic()[&(lec_var("A-1"), lec_var("B-1"))];
        // hard overlap plus the ever-present credit cross term.
        assert_eq!(q, 10_000.0 + 100.0 * 2.0 * 9.0);
    }

    #[test]
    fn gap_classification_rewards_contiguity_and_penalizes_tension() {
        let prefs = Preferences::default();
        let contiguous = build_timetable_bqm(
            &[
                lecture("A-1", 3.0, "월 09:00-10:00"),
                lecture("B-1", 3.0, "월 10:30-11:30"),
            ],
            &prefs,
            no_progress,
        );
        let q = contiguous.quadratic()[&(lec_var("A-1"), lec_var("B-1"))];
        assert_eq!(q, -20.0 + 100.0 * 2.0 * 9.0);

        let tension = build_timetable_bqm(
            &[
                lecture("A-1", 3.0, "월 09:00-10:00"),
                lecture("B-1", 3.0, "월 12:30-13:30"),
            ],
            &prefs,
            no_progress,
        );
        let q = tension.quadratic()[&(lec_var("A-1"), lec_var("B-1"))];
        let expected = 5.0 * f64::from(150u16).sqrt() + 100.0 * 2.0 * 9.0;
        assert!((q - expected).abs() < 1e-9);

        let distant = build_timetable_bqm(
            &[
                lecture("A-1", 3.0, "월 09:00-10:00"),
                lecture("B-1", 3.0, "월 16:00-17:00"),
            ],
            &prefs,
            no_progress,
        );
        let q = distant.quadratic()[&(lec_var("A-1"), lec_var("B-1"))];
        assert_eq!(q, 100.0 * 2.0 * 9.0);
    }

    #[test]
    fn per_day_contributions_sum_across_shared_days() {
        // Overlap on Monday, contiguous on Wednesday: both contribute.
        let pool = vec![
            lecture("A-1", 3.0, "월 10:00-11:00 수 09:00-10:00"),
            lecture("B-1", 3.0, "월 10:30-11:30 수 10:30-11:30"),
        ];
        let bqm = build_timetable_bqm(&pool, &Preferences::default(), no_progress);
        let q = bqm.quadratic()[&(lec_var("A-1"), lec_var("B-1"))];
        assert_eq!(q, 10_000.0 - 20.0 + 100.0 * 2.0 * 9.0);
    }

    #[test]
    fn free_day_variables_exist_only_for_touched_days() {
        let pool = vec![lecture("A-1", 3.0, "월 14:00(60)")];
        let bqm = build_timetable_bqm(&pool, &Preferences::default(), no_progress);

        let days: Vec<&Var> = bqm
            .variables()
            .filter(|v| matches!(v, Var::FreeDay(_)))
            .collect();
        assert_eq!(days, vec![&Var::FreeDay(Day::Mon)]);
        assert_eq!(bqm.linear()[&Var::FreeDay(Day::Mon)], -100.0);
        let coupling = bqm.quadratic()[&(lec_var("A-1"), Var::FreeDay(Day::Mon))];
        assert_eq!(coupling, 500.0);
    }

    #[test]
    fn double_interval_day_couples_the_auxiliary_once_and_skips_self_pairs() {
        let pool = vec![lecture("A-1", 3.0, "월 09:00-10:00 월 11:00-12:00")];
        let bqm = build_timetable_bqm(&pool, &Preferences::default(), no_progress);
        let coupling = bqm.quadratic()[&(lec_var("A-1"), Var::FreeDay(Day::Mon))];
        assert_eq!(coupling, 500.0);
        // No lecture-lecture pair key may exist for a single lecture.
        assert_eq!(bqm.quadratic().len(), 1);
    }

    #[test]
    fn lecture_without_intervals_only_carries_credit_terms() {
        let pool = vec![
            lecture("A-1", 3.0, ""),
            lecture("B-1", 3.0, "화 14:00(60)"),
        ];
        let prefs = Preferences {
            target_credits: 6.0,
            ..Preferences::default()
        };
        let bqm = build_timetable_bqm(&pool, &prefs, no_progress);
        assert_eq!(bqm.linear()[&lec_var("A-1")], 100.0 * (9.0 - 36.0));
        // A-1 touches no day, so its only pair term is the credit cross.
        let q = bqm.quadratic()[&(lec_var("A-1"), lec_var("B-1"))];
        assert_eq!(q, 100.0 * 2.0 * 9.0);
    }

    #[test]
    fn progress_milestones_fire_in_order() {
        let pool = vec![lecture("A-1", 3.0, "월 14:00(60)")];
        let mut seen = Vec::new();
        build_timetable_bqm(&pool, &Preferences::default(), |msg, pct| {
            seen.push((msg.to_owned(), pct));
        });
        assert_eq!(seen.first().unwrap().1, 10);
        assert_eq!(seen.last().unwrap().1, 95);
        assert!(seen.iter().any(|(m, _)| m.contains("day 월")));
        let pcts: Vec<u8> = seen.iter().map(|(_, p)| *p).collect();
        let mut sorted = pcts.clone();
        sorted.sort_unstable();
        assert_eq!(pcts, sorted);
    }

    #[test]
    fn energy_evaluates_linear_and_quadratic_terms() {
        let mut bqm = Bqm::default();
        bqm.add_linear(lec_var("a"), 2.0);
        bqm.add_linear(lec_var("b"), -3.0);
        bqm.add_quadratic(lec_var("a"), lec_var("b"), 10.0);
        assert_eq!(bqm.energy(|_| true), 9.0);
        assert_eq!(bqm.energy(|v| *v == lec_var("a")), 2.0);
        assert_eq!(bqm.energy(|_| false), 0.0);
    }
}
