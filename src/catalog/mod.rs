//! Lecture catalog: the immutable in-memory snapshot of the course table.
//!
//! Loaded once at startup and shared behind an `Arc`; nothing mutates it
//! afterwards, so handlers and workers read it without locking.

pub mod loader;

use crate::solver::time::TimeSlot;
use serde::Serialize;
use std::collections::HashMap;

/// One course section. `id` is `"<number>-<class_num>"` and doubles as the
/// BQM variable name for this lecture.
#[derive(Debug, Clone, Serialize)]
pub struct Lecture {
    pub id: String,
    pub number: String,
    pub class_num: String,
    pub name: String,
    pub credit: f64,
    pub time_room: String,
    pub professor: String,
    pub category: String,
    /// Meeting intervals parsed from `time_room`; derived state, not wire
    /// data.
    #[serde(skip)]
    pub time_slots: Vec<TimeSlot>,
}

/// Read-only lecture store with id lookup.
#[derive(Debug, Default)]
pub struct Catalog {
    lectures: Vec<Lecture>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, keeping the first occurrence of each id.
    pub fn new(lectures: Vec<Lecture>) -> Self {
        let mut deduped = Vec::with_capacity(lectures.len());
        let mut by_id = HashMap::with_capacity(lectures.len());
        for lec in lectures {
            if by_id.contains_key(&lec.id) {
                continue;
            }
            by_id.insert(lec.id.clone(), deduped.len());
            deduped.push(lec);
        }
        Self {
            lectures: deduped,
            by_id,
        }
    }

    pub fn lectures(&self) -> &[Lecture] {
        &self.lectures
    }

    pub fn get(&self, id: &str) -> Option<&Lecture> {
        self.by_id.get(id).map(|&i| &self.lectures[i])
    }

    pub fn len(&self) -> usize {
        self.lectures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lectures.is_empty()
    }
}
