//! Meeting-time model: schedule-string parsing and interval arithmetic.
//!
//! Catalog schedule strings are semi-structured Korean text mixing meeting
//! times with room codes, e.g. `화 16:30(75) 507-102` or `수 13:30-16:30
//! 밀양M03-3350`. The parser pulls every well-formed time fragment out of the
//! string and ignores everything else.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Day of the week as it appears in catalog schedule strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    /// All seven days in week order.
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];

    /// The single-character Korean label used in schedule strings.
    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "월",
            Day::Tue => "화",
            Day::Wed => "수",
            Day::Thu => "목",
            Day::Fri => "금",
            Day::Sat => "토",
            Day::Sun => "일",
        }
    }

    /// Inverse of [`Day::label`].
    pub fn from_label(label: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|d| d.label() == label)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A single meeting interval. `start` and `end` are minutes from midnight,
/// with `start < end` for every parsed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub day: Day,
    pub start: u16,
    pub end: u16,
}

/// Duration form: `화 16:30(75)` — start time plus length in minutes.
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([월화수목금토일])\s*(\d{2}):(\d{2})\((\d+)\)").unwrap());

/// Range form: `수 13:30-16:30`.
static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([월화수목금토일])\s*(\d{2}):(\d{2})-(\d{2}):(\d{2})").unwrap());

/// Parses a raw schedule string into meeting intervals.
///
/// Both the duration form and the range form are recognized, any number of
/// times, anywhere in the string. Text that matches neither pattern is
/// ignored; an empty or unmatched string yields an empty slot list.
pub fn parse_schedule(raw: &str) -> Vec<TimeSlot> {
    let mut slots = Vec::new();

    for caps in DURATION_RE.captures_iter(raw) {
        let Some(day) = Day::from_label(&caps[1]) else {
            continue;
        };
        let (Ok(hour), Ok(minute), Ok(length)) = (
            caps[2].parse::<u16>(),
            caps[3].parse::<u16>(),
            caps[4].parse::<u16>(),
        ) else {
            continue;
        };
        let start = hour * 60 + minute;
        slots.push(TimeSlot {
            day,
            start,
            end: start.saturating_add(length),
        });
    }

    for caps in RANGE_RE.captures_iter(raw) {
        let Some(day) = Day::from_label(&caps[1]) else {
            continue;
        };
        let (Ok(sh), Ok(sm), Ok(eh), Ok(em)) = (
            caps[2].parse::<u16>(),
            caps[3].parse::<u16>(),
            caps[4].parse::<u16>(),
            caps[5].parse::<u16>(),
        ) else {
            continue;
        };
        slots.push(TimeSlot {
            day,
            start: sh * 60 + sm,
            end: eh * 60 + em,
        });
    }

    slots
}

/// Whether any pair of same-day intervals overlaps. Touching boundaries
/// (one ends exactly when the other starts) do not overlap.
pub fn overlaps(a: &[TimeSlot], b: &[TimeSlot]) -> bool {
    a.iter().any(|x| {
        b.iter()
            .any(|y| x.day == y.day && x.start.max(y.start) < x.end.min(y.end))
    })
}

/// [`overlaps`] restricted to intervals on one day.
pub fn overlaps_on(a: &[TimeSlot], b: &[TimeSlot], day: Day) -> bool {
    a.iter().filter(|x| x.day == day).any(|x| {
        b.iter()
            .filter(|y| y.day == day)
            .any(|y| x.start.max(y.start) < x.end.min(y.end))
    })
}

/// Minimum gap in minutes over all same-day non-overlapping interval pairs.
///
/// Returns 0 when no pair shares a day, and 0 when every same-day pair
/// overlaps.
pub fn gap(a: &[TimeSlot], b: &[TimeSlot]) -> u16 {
    min_gap(a.iter(), b)
}

/// [`gap`] restricted to intervals on one day.
pub fn gap_on(a: &[TimeSlot], b: &[TimeSlot], day: Day) -> u16 {
    min_gap(a.iter().filter(|x| x.day == day), b)
}

fn min_gap<'a>(a: impl Iterator<Item = &'a TimeSlot>, b: &[TimeSlot]) -> u16 {
    let mut best: Option<u16> = None;
    for x in a {
        for y in b.iter().filter(|y| y.day == x.day) {
            let g = if x.end <= y.start {
                y.start - x.end
            } else if y.end <= x.start {
                x.start - y.end
            } else {
                continue; // overlapping pair
            };
            best = Some(best.map_or(g, |m| m.min(g)));
        }
    }
    best.unwrap_or(0)
}

/// Total meeting minutes across all of a lecture's intervals.
pub fn total_minutes(slots: &[TimeSlot]) -> u32 {
    slots.iter().map(|s| u32::from(s.end - s.start)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: Day, start: u16, end: u16) -> TimeSlot {
        TimeSlot { day, start, end }
    }

    #[test]
    fn parses_duration_form_with_room_suffix() {
        let slots = parse_schedule("화 16:30(75) 507-102");
        assert_eq!(slots, vec![slot(Day::Tue, 990, 1065)]);
    }

    #[test]
    fn parses_range_form_with_room_suffix() {
        let slots = parse_schedule("수 13:30-16:30 밀양M03-3350");
        assert_eq!(slots, vec![slot(Day::Wed, 810, 990)]);
    }

    #[test]
    fn parses_mixed_forms_in_one_string() {
        let slots = parse_schedule("월 09:00(50) 화 10:00-11:15");
        assert_eq!(
            slots,
            vec![slot(Day::Mon, 540, 590), slot(Day::Tue, 600, 675)]
        );
    }

    #[test]
    fn ignores_garbage_and_empty_input() {
        assert!(parse_schedule("").is_empty());
        assert!(parse_schedule("원격강의 (미지정)").is_empty());
        let slots = parse_schedule("강의실 미정 / 금 14:00(90) / 비고");
        assert_eq!(slots, vec![slot(Day::Fri, 840, 930)]);
    }

    #[test]
    fn round_trips_canonical_forms() {
        // Both written forms of the same interval parse to the same slot.
        for (day, start, end) in [(Day::Mon, 0u16, 90u16), (Day::Sun, 1350, 1440)] {
            let range = format!(
                "{} {:02}:{:02}-{:02}:{:02}",
                day.label(),
                start / 60,
                start % 60,
                end / 60,
                end % 60
            );
            let duration = format!(
                "{} {:02}:{:02}({})",
                day.label(),
                start / 60,
                start % 60,
                end - start
            );
            assert_eq!(parse_schedule(&range), vec![slot(day, start, end)]);
            assert_eq!(parse_schedule(&duration), vec![slot(day, start, end)]);
        }
    }

    #[test]
    fn overlap_is_symmetric_and_reflexive() {
        let a = vec![slot(Day::Mon, 600, 690)];
        let b = vec![slot(Day::Mon, 630, 720)];
        let c = vec![slot(Day::Tue, 600, 690)];
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
        assert!(!overlaps(&a, &c));
        assert!(overlaps(&a, &a));
        assert!(!overlaps(&[], &[]));
    }

    #[test]
    fn touching_boundaries_do_not_overlap() {
        let a = vec![slot(Day::Mon, 600, 690)];
        let b = vec![slot(Day::Mon, 690, 780)];
        assert!(!overlaps(&a, &b));
        assert_eq!(gap(&a, &b), 0);
    }

    #[test]
    fn gap_is_symmetric_and_takes_the_minimum() {
        let a = vec![slot(Day::Mon, 540, 600), slot(Day::Wed, 540, 600)];
        let b = vec![slot(Day::Mon, 720, 780), slot(Day::Wed, 630, 690)];
        assert_eq!(gap(&a, &b), 30);
        assert_eq!(gap(&b, &a), 30);
    }

    #[test]
    fn gap_is_zero_without_a_shared_day_or_with_full_overlap() {
        let a = vec![slot(Day::Mon, 540, 600)];
        let b = vec![slot(Day::Tue, 700, 760)];
        assert_eq!(gap(&a, &b), 0);
        let c = vec![slot(Day::Mon, 550, 590)];
        assert_eq!(gap(&a, &c), 0);
    }

    #[test]
    fn gap_on_restricts_to_one_day() {
        let a = vec![slot(Day::Mon, 540, 600), slot(Day::Wed, 540, 600)];
        let b = vec![slot(Day::Mon, 720, 780), slot(Day::Wed, 630, 690)];
        assert_eq!(gap_on(&a, &b, Day::Mon), 120);
        assert_eq!(gap_on(&a, &b, Day::Wed), 30);
        assert_eq!(gap_on(&a, &b, Day::Fri), 0);
    }

    #[test]
    fn total_minutes_sums_all_slots() {
        let slots = vec![slot(Day::Mon, 540, 600), slot(Day::Wed, 540, 630)];
        assert_eq!(total_minutes(&slots), 150);
    }
}
