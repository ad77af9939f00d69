//! Candidate pool selection: every mandatory lecture plus a random fill from
//! the rest of the catalog, bounded by `max_candidates`.

use crate::catalog::{Catalog, Lecture};
use crate::solver::error::SolverError;
use crate::solver::prefs::Preferences;
use rand::Rng;
use rand::seq::SliceRandom;

/// Builds the lecture pool handed to the BQM compiler.
///
/// Mandatory lectures (in catalog order) always make the pool; the remainder
/// of the catalog is shuffled and fills up to `max_candidates`. When the
/// mandatory set alone exceeds the cap, the cap yields and the whole set is
/// emitted.
pub fn select_candidates(
    catalog: &Catalog,
    prefs: &Preferences,
    rng: &mut impl Rng,
) -> Result<Vec<Lecture>, SolverError> {
    let (mandatory, mut rest): (Vec<&Lecture>, Vec<&Lecture>) = catalog
        .lectures()
        .iter()
        .partition(|lec| prefs.mandatory_ids.contains(&lec.id));

    rest.shuffle(rng);
    let fill = prefs.max_candidates.saturating_sub(mandatory.len());

    let mut pool: Vec<Lecture> = mandatory.into_iter().cloned().collect();
    pool.extend(rest.into_iter().take(fill).cloned());

    if pool.is_empty() {
        return Err(SolverError::NoCandidates);
    }
    Ok(pool)
}
