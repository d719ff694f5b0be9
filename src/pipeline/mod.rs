//! End-to-end resolution pipeline
//!
//! Phases: canonicalize every snapshot entry into the clause store,
//! segment each distinct clause, build the dictionary, resolve segments
//! to reconciliation fixpoint, then fold the timeline into validity
//! intervals. Outputs are sorted for deterministic export, so two runs
//! over the same snapshots produce identical tables.

pub mod report;

pub use report::{IntervalConflict, RunReport};

use crate::canonical::{ClauseStore, canonicalize};
use crate::config::ResolverConfig;
use crate::dictionary::{Dictionary, DictionaryBuilder};
use crate::error::{Result, ResolverError};
use crate::models::{
    Clause, DictionaryEntry, Fingerprint, Occurrence, ProductId, Segment, SegmentOrigin, Snapshot,
    SnapshotDate, ValidityInterval,
};
use crate::resolver::{ResolutionContext, Resolver};
use crate::segmenter::{FallbackGate, FallbackSegmenter, SegmentStore, segment_clause};
use crate::source::validate_chronology;
use crate::temporal::{Observation, resolve_intervals};
use crate::utils::progress::{finish, phase_bar, phase_spinner};
use log::{info, warn};
use rayon::prelude::*;
use std::sync::Arc;

/// One (snapshot, product, clause) sighting retained for the temporal fold
type Sighting = (SnapshotDate, ProductId, Fingerprint);

/// The four output tables plus the run summary
#[derive(Debug)]
pub struct PipelineOutput {
    /// Deduplicated clauses, sorted by fingerprint
    pub clauses: Vec<Clause>,
    /// All segments, sorted by clause fingerprint and ordinal
    pub segments: Vec<Segment>,
    /// Dictionary entries, sorted by name and code
    pub dictionary: Vec<DictionaryEntry>,
    /// Validity intervals, sorted by product, code and start
    pub intervals: Vec<ValidityInterval>,
    /// Run summary counters
    pub report: RunReport,
}

/// The resolution pipeline
pub struct Pipeline {
    config: ResolverConfig,
}

impl Pipeline {
    /// Create a pipeline with the given configuration
    #[must_use]
    pub const fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Run all phases over an ordered snapshot sequence
    ///
    /// # Errors
    /// Fails on out-of-order snapshots; per-pair interval conflicts are
    /// reported in the output instead of failing the run.
    pub async fn run(
        &self,
        snapshots: &[Snapshot],
        fallback: Option<Arc<dyn FallbackSegmenter>>,
    ) -> Result<PipelineOutput> {
        validate_chronology(snapshots)?;
        let mut report = RunReport {
            snapshots: snapshots.len(),
            entries: snapshots.iter().map(|s| s.entries.len()).sum(),
            ..RunReport::default()
        };

        let (clauses, sightings) = self.canonicalize_phase(snapshots);
        report.distinct_clauses = clauses.len();
        info!(
            "Canonicalized {} entries into {} distinct clauses",
            report.entries, report.distinct_clauses
        );

        let segments = self.segment_phase(&clauses, fallback).await;
        report.segments = segments.segment_count();
        for seg in segments.iter_segments() {
            match seg.origin {
                SegmentOrigin::Structural => report.structural_segments += 1,
                SegmentOrigin::Fallback => report.fallback_segments += 1,
                SegmentOrigin::WholeClause => report.whole_clause_segments += 1,
            }
        }
        report.fallback_clauses = segments
            .iter_segments()
            .filter(|s| s.ordinal == 0 && s.origin == SegmentOrigin::Fallback)
            .count();

        let ctx = ResolutionContext::build(snapshots, &clauses);
        let (dict, mut segments, passes, scan_stats) =
            self.resolve_phase(&clauses, segments, &ctx);
        report.reconciliation_passes = passes;
        report.dictionary_entries = dict.len();
        report.announced_entries = scan_stats.announced;
        report.single_segment_entries = scan_stats.single_segment;
        report.ordinal_entries = scan_stats.ordinal;
        report.absorbed_entries = scan_stats.absorbed;
        report.ambiguous_names = dict.ambiguous_names().len();

        // flag unresolved segments for review so the export surfaces them
        for seg in segments.iter_segments_mut() {
            if seg.resolution.is_none() {
                seg.needs_review = true;
            }
        }
        for seg in segments.iter_segments() {
            report.count_tier(seg.tier());
        }
        report.needs_review = segments.iter_segments().filter(|s| s.needs_review).count();

        let timeline: Vec<SnapshotDate> = snapshots.iter().map(|s| s.date).collect();
        let observations = collect_observations(&sightings, &segments);
        let (mut intervals, errors) = resolve_intervals(&observations, &timeline);
        for e in &errors {
            warn!("{e}");
            if let ResolverError::IntervalOverlap { product, code, date } = e {
                report.interval_conflicts.push(IntervalConflict {
                    product: product.clone(),
                    code: code.clone(),
                    date: *date,
                });
            }
        }
        intervals.sort_by(|a, b| {
            a.product
                .cmp(&b.product)
                .then_with(|| a.code.cmp(&b.code))
                .then_with(|| a.start.cmp(&b.start))
        });
        report.intervals = intervals.len();
        report.open_intervals = intervals.iter().filter(|i| i.is_open()).count();
        report.interval_errors = errors.len();
        report.log_summary();

        Ok(PipelineOutput {
            clauses: clauses.to_sorted_vec(),
            segments: segments.to_sorted_vec(),
            dictionary: dict.to_sorted_vec(),
            intervals,
            report,
        })
    }

    /// Phase 1: canonicalize entries, dedup clauses, retain sightings
    fn canonicalize_phase(&self, snapshots: &[Snapshot]) -> (ClauseStore, Vec<Sighting>) {
        let rows: Vec<(SnapshotDate, &ProductId, &str)> = snapshots
            .iter()
            .flat_map(|s| {
                s.entries
                    .iter()
                    .map(move |e| (s.date, &e.product_id, e.text.as_str()))
            })
            .collect();

        let pb = phase_bar(rows.len() as u64, "canonicalizing", self.config.show_progress);
        let mut clauses = ClauseStore::new();
        let mut sightings = Vec::with_capacity(rows.len());

        if self.config.use_parallel && rows.len() >= self.config.parallel_threshold {
            // canonicalization fans out, the store merge stays single-writer
            let canonical: Vec<(Fingerprint, String)> = rows
                .par_iter()
                .map(|(_, _, text)| canonicalize(text))
                .collect();
            for ((date, product, _), (fingerprint, text)) in rows.iter().zip(canonical) {
                clauses.insert(
                    fingerprint.clone(),
                    text,
                    Occurrence {
                        product: (*product).clone(),
                        date: *date,
                    },
                );
                sightings.push((*date, (*product).clone(), fingerprint));
                pb.inc(1);
            }
        } else {
            for (date, product, text) in rows {
                let fingerprint = clauses.observe(text, product.clone(), date);
                sightings.push((date, product.clone(), fingerprint));
                pb.inc(1);
            }
        }
        finish(&pb, "canonicalized");
        (clauses, sightings)
    }

    /// Phase 2: segment every distinct clause once
    async fn segment_phase(
        &self,
        clauses: &ClauseStore,
        fallback: Option<Arc<dyn FallbackSegmenter>>,
    ) -> SegmentStore {
        let gate = fallback.map(|f| FallbackGate::new(f, &self.config));
        let spinner = phase_spinner("segmenting clauses", self.config.show_progress);

        let futures = clauses.iter().map(|clause| {
            let gate = gate.as_ref();
            async move { (clause.fingerprint.clone(), segment_clause(clause, gate).await) }
        });
        let results = futures::future::join_all(futures).await;

        let mut segments = SegmentStore::new();
        for (fingerprint, segs) in results {
            segments.insert(fingerprint, segs);
        }
        finish(&spinner, "segmented");
        segments
    }

    /// Phases 3 and 4: dictionary build plus resolution to fixpoint
    fn resolve_phase(
        &self,
        clauses: &ClauseStore,
        mut segments: SegmentStore,
        ctx: &ResolutionContext,
    ) -> (Dictionary, SegmentStore, usize, crate::dictionary::ScanStats) {
        let mut dict = Dictionary::new();
        let mut builder = DictionaryBuilder::new();
        builder.scan(clauses, &segments, &mut dict);
        info!("Initial dictionary scan produced {} entries", dict.len());

        let resolver = Resolver::new(&self.config, ctx);
        let mut passes = 0;
        loop {
            passes += 1;
            let upgrades = resolver.resolve_pass(&mut segments, &dict);
            let grew = builder.absorb_resolutions(clauses, &segments, &mut dict);
            if upgrades == 0 && !grew {
                break;
            }
            if passes >= self.config.max_reconciliation_passes {
                warn!(
                    "Reconciliation stopped after {passes} passes without reaching a fixpoint"
                );
                break;
            }
        }
        (dict, segments, passes, builder.stats())
    }
}

/// Expand per-clause segments into per-snapshot observations
fn collect_observations(sightings: &[Sighting], segments: &SegmentStore) -> Vec<Observation> {
    let mut observations = Vec::new();
    for (date, product, clause) in sightings {
        let Some(segs) = segments.get(clause) else {
            continue;
        };
        for seg in segs {
            if let Some(resolution) = &seg.resolution {
                observations.push(Observation {
                    product: product.clone(),
                    code: resolution.code.clone(),
                    segment: seg.fingerprint.clone(),
                    date: *date,
                });
            }
        }
    }
    observations
}
