//! One-shot CSV ingestion of the lecture table.

use crate::catalog::{Catalog, Lecture};
use crate::solver::time::parse_schedule;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// A raw row of the course table. Headers are the Korean column names of the
/// published spreadsheet.
#[derive(Debug, Deserialize)]
struct LectureRow {
    #[serde(rename = "교과목번호")]
    number: String,
    #[serde(rename = "분반")]
    class_num: String,
    #[serde(rename = "교과목명")]
    name: String,
    #[serde(rename = "학점", default)]
    credit: String,
    #[serde(rename = "시간표", default)]
    time_room: String,
    #[serde(rename = "교수명", default)]
    professor: String,
    #[serde(rename = "교과목구분", default)]
    category: String,
}

/// Reads the lecture table from `path`.
///
/// Rows without a schedule string are dropped (they cannot take part in
/// timetable optimization), malformed rows are skipped with a warning, and a
/// blank credit column parses to 0.0. Duplicate ids keep their first row.
/// A missing or unreadable file is an error; the caller decides whether
/// that is fatal.
pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open lecture table at {}", path.display()))?;

    let mut lectures = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize() {
        let row: LectureRow = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "skipping malformed catalog row");
                skipped += 1;
                continue;
            }
        };
        if row.time_room.trim().is_empty() {
            skipped += 1;
            continue;
        }

        let credit = row.credit.trim().parse::<f64>().unwrap_or(0.0);
        let time_slots = parse_schedule(&row.time_room);
        lectures.push(Lecture {
            id: format!("{}-{}", row.number, row.class_num),
            number: row.number,
            class_num: row.class_num,
            name: row.name,
            credit,
            time_room: row.time_room,
            professor: row.professor,
            category: row.category,
            time_slots,
        });
    }

    debug!(rows = lectures.len(), skipped, "lecture table read");
    Ok(Catalog::new(lectures))
}
