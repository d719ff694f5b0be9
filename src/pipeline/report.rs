//! Run summary

use crate::models::ConfidenceTier;
use chrono::NaiveDate;
use log::info;
use serde::Serialize;

/// One (product, code) pair dropped by the temporal fold
#[derive(Debug, Clone, Serialize)]
pub struct IntervalConflict {
    /// Product whose sightings contradicted each other
    pub product: String,
    /// Code the contradictory sightings resolved to
    pub code: String,
    /// Snapshot date carrying the contradiction
    pub date: NaiveDate,
}

/// Counters summarizing one pipeline run
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunReport {
    /// Snapshots ingested
    pub snapshots: usize,
    /// Snapshot entries ingested
    pub entries: usize,
    /// Distinct clauses after deduplication
    pub distinct_clauses: usize,
    /// Total segments produced
    pub segments: usize,
    /// Segments split at structural headings
    pub structural_segments: usize,
    /// Segments with fallback-provided boundaries
    pub fallback_segments: usize,
    /// Whole-clause segments (no marker, no fallback answer)
    pub whole_clause_segments: usize,
    /// Clauses segmented by the fallback segmenter
    pub fallback_clauses: usize,
    /// Segments flagged for manual review
    pub needs_review: usize,
    /// Dictionary entries after reconciliation
    pub dictionary_entries: usize,
    /// Entries evidenced by an announcement phrase
    pub announced_entries: usize,
    /// Entries from single-segment pairing
    pub single_segment_entries: usize,
    /// Entries from ordinal pairing
    pub ordinal_entries: usize,
    /// Entries absorbed from resolved segments during reconciliation
    pub absorbed_entries: usize,
    /// Names mapping to more than one code
    pub ambiguous_names: usize,
    /// Reconciliation passes until fixpoint
    pub reconciliation_passes: usize,
    /// Segments resolved at the explicit tier
    pub resolved_explicit: usize,
    /// Segments resolved at the fuzzy tier
    pub resolved_fuzzy: usize,
    /// Segments resolved at the brand tier
    pub resolved_brand: usize,
    /// Segments resolved at the cross-dossier tier
    pub resolved_cross_dossier: usize,
    /// Segments left unresolved
    pub unresolved: usize,
    /// Validity intervals produced
    pub intervals: usize,
    /// Intervals still open at the final snapshot
    pub open_intervals: usize,
    /// (product, code) pairs dropped for contradictory sightings
    pub interval_errors: usize,
    /// Diagnostics for each dropped pair
    pub interval_conflicts: Vec<IntervalConflict>,
}

impl RunReport {
    /// Record one segment's final tier
    pub fn count_tier(&mut self, tier: ConfidenceTier) {
        match tier {
            ConfidenceTier::Explicit => self.resolved_explicit += 1,
            ConfidenceTier::Fuzzy => self.resolved_fuzzy += 1,
            ConfidenceTier::Brand => self.resolved_brand += 1,
            ConfidenceTier::CrossDossier => self.resolved_cross_dossier += 1,
            ConfidenceTier::Unresolved => self.unresolved += 1,
        }
    }

    /// Log the summary at info level
    pub fn log_summary(&self) {
        info!(
            "Ingested {} snapshots ({} entries), {} distinct clauses",
            self.snapshots, self.entries, self.distinct_clauses
        );
        info!(
            "Segmentation: {} segments ({} structural, {} fallback, {} whole-clause; {} clauses via fallback, {} flagged for review)",
            self.segments,
            self.structural_segments,
            self.fallback_segments,
            self.whole_clause_segments,
            self.fallback_clauses,
            self.needs_review
        );
        info!(
            "Dictionary: {} entries ({} announced, {} single-segment, {} ordinal, {} absorbed), {} ambiguous names, {} reconciliation passes",
            self.dictionary_entries,
            self.announced_entries,
            self.single_segment_entries,
            self.ordinal_entries,
            self.absorbed_entries,
            self.ambiguous_names,
            self.reconciliation_passes
        );
        info!(
            "Resolution: {} explicit, {} fuzzy, {} brand, {} cross-dossier, {} unresolved",
            self.resolved_explicit,
            self.resolved_fuzzy,
            self.resolved_brand,
            self.resolved_cross_dossier,
            self.unresolved
        );
        info!(
            "Intervals: {} total, {} open, {} pairs dropped",
            self.intervals, self.open_intervals, self.interval_errors
        );
    }
}
