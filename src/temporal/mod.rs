//! Validity intervals
//!
//! Replays the snapshot timeline per (product, code) pair through a
//! small state machine: a pair opens an interval when first observed,
//! extends it while the same segment text keeps appearing, closes and
//! reopens when the text changes, and closes at the last-seen snapshot
//! when the pair disappears. A later reappearance starts a new
//! interval, so coverage gaps survive into the output.
//!
//! Two different segment texts claiming the same pair in one snapshot
//! would produce overlapping intervals; that pair is dropped with an
//! error and the run continues.

use crate::error::ResolverError;
use crate::models::{Fingerprint, IndicationCode, ProductId, SnapshotDate, ValidityInterval};
use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// One resolved segment sighting in one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Product the sighting belongs to
    pub product: ProductId,
    /// Resolved indication code
    pub code: IndicationCode,
    /// Fingerprint of the observed segment text
    pub segment: Fingerprint,
    /// Snapshot the sighting came from
    pub date: SnapshotDate,
}

type PairKey = (ProductId, IndicationCode);
type PairSightings = BTreeMap<SnapshotDate, Vec<Fingerprint>>;

/// Fold observations into validity intervals
///
/// `timeline` is the full ordered snapshot sequence; absence of a pair
/// in a timeline snapshot is what closes its interval. Pairs with
/// contradictory sightings are reported as errors and excluded.
#[must_use]
pub fn resolve_intervals(
    observations: &[Observation],
    timeline: &[SnapshotDate],
) -> (Vec<ValidityInterval>, Vec<ResolverError>) {
    let mut pairs: FxHashMap<PairKey, PairSightings> = FxHashMap::default();
    for obs in observations {
        let sightings = pairs
            .entry((obs.product.clone(), obs.code.clone()))
            .or_default()
            .entry(obs.date)
            .or_default();
        if !sightings.contains(&obs.segment) {
            sightings.push(obs.segment.clone());
        }
    }
    debug!(
        "Folding {} observations into {} (product, code) pairs",
        observations.len(),
        pairs.len()
    );

    let mut keyed: Vec<(PairKey, PairSightings)> = pairs.into_iter().collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let results: Vec<std::result::Result<Vec<ValidityInterval>, ResolverError>> = keyed
        .into_par_iter()
        .map(|((product, code), sightings)| fold_pair(&product, &code, &sightings, timeline))
        .collect();

    let mut intervals = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(mut pair_intervals) => intervals.append(&mut pair_intervals),
            Err(e) => errors.push(e),
        }
    }
    (intervals, errors)
}

fn fold_pair(
    product: &ProductId,
    code: &IndicationCode,
    sightings: &PairSightings,
    timeline: &[SnapshotDate],
) -> std::result::Result<Vec<ValidityInterval>, ResolverError> {
    let mut intervals = Vec::new();
    // (start, last seen, segment fingerprint) of the open interval
    let mut open: Option<(SnapshotDate, SnapshotDate, Fingerprint)> = None;

    for &date in timeline {
        match sightings.get(&date) {
            Some(fps) => {
                let [fp] = fps.as_slice() else {
                    return Err(ResolverError::IntervalOverlap {
                        product: product.as_str().to_string(),
                        code: code.as_str().to_string(),
                        date: date.date(),
                    });
                };
                match open.take() {
                    None => open = Some((date, date, fp.clone())),
                    Some((start, _, current)) if &current == fp => {
                        open = Some((start, date, current));
                    }
                    Some((start, last, current)) => {
                        // text changed: close at the last sighting and reopen
                        intervals.push(interval(product, code, current, start, Some(last)));
                        open = Some((date, date, fp.clone()));
                    }
                }
            }
            None => {
                if let Some((start, last, current)) = open.take() {
                    intervals.push(interval(product, code, current, start, Some(last)));
                }
            }
        }
    }
    if let Some((start, _, current)) = open {
        intervals.push(interval(product, code, current, start, None));
    }
    Ok(intervals)
}

fn interval(
    product: &ProductId,
    code: &IndicationCode,
    segment: Fingerprint,
    start: SnapshotDate,
    end: Option<SnapshotDate>,
) -> ValidityInterval {
    ValidityInterval {
        product: product.clone(),
        code: code.clone(),
        segment,
        start,
        end,
    }
}

/// Check the per-pair non-overlap invariant over a finished interval set
#[must_use]
pub fn validate_non_overlap(intervals: &[ValidityInterval]) -> bool {
    let mut by_pair: FxHashMap<(&ProductId, &IndicationCode), Vec<&ValidityInterval>> =
        FxHashMap::default();
    for interval in intervals {
        by_pair
            .entry((&interval.product, &interval.code))
            .or_default()
            .push(interval);
    }
    by_pair.values().all(|group| {
        group
            .iter()
            .enumerate()
            .all(|(i, a)| group[i + 1..].iter().all(|b| !a.overlaps(b)))
    })
}
