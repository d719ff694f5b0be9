//! Clause segmentation
//!
//! Splits each distinct clause into indication segments, structurally
//! where the markup allows it and through the external fallback
//! segmenter otherwise. Results are cached per clause fingerprint, so
//! a clause reappearing in later snapshots is never segmented twice.

pub mod fallback;
pub mod structural;

pub use fallback::{
    FallbackGate, FallbackRequest, FallbackResponse, FallbackSegment, FallbackSegmenter,
    LengthHint,
};
pub use structural::{is_structural_name, leading_name, split_structural, truncated_heading};

use crate::canonical::fingerprint_text;
use crate::models::{Clause, Fingerprint, Segment, SegmentOrigin};
use log::warn;
use rustc_hash::FxHashMap;

/// Build the single whole-clause segment for an unsplittable clause
#[must_use]
pub fn whole_clause_segment(clause: &Clause, needs_review: bool) -> Vec<Segment> {
    let heading = leading_name(&clause.text).or_else(|| truncated_heading(&clause.text));
    vec![Segment {
        clause: clause.fingerprint.clone(),
        ordinal: 0,
        fingerprint: fingerprint_text(&clause.text),
        heading,
        text: clause.text.clone(),
        origin: SegmentOrigin::WholeClause,
        needs_review,
        resolution: None,
    }]
}

/// Turn a fallback response into segments for a clause
#[must_use]
pub fn from_fallback(clause: &Clause, response: &FallbackResponse) -> Vec<Segment> {
    response
        .segments
        .iter()
        .enumerate()
        .map(|(ordinal, block)| {
            let text = block.text.trim().to_string();
            let heading = block
                .suggested_name
                .clone()
                .or_else(|| leading_name(&text));
            Segment {
                clause: clause.fingerprint.clone(),
                ordinal,
                fingerprint: fingerprint_text(&text),
                heading,
                text,
                origin: SegmentOrigin::Fallback,
                needs_review: false,
                resolution: None,
            }
        })
        .collect()
}

/// Segment one clause, consulting the fallback gate when markup gives
/// no boundary
///
/// Never returns an empty vector: a clause that cannot be split yields
/// exactly one whole-clause segment. Fallback failures degrade to that
/// single segment flagged for review rather than aborting the run.
pub async fn segment_clause(clause: &Clause, gate: Option<&FallbackGate>) -> Vec<Segment> {
    if let Some(segments) = split_structural(clause) {
        if !segments.is_empty() {
            return segments;
        }
        // every bold run was structural: single-indication clause
        return whole_clause_segment(clause, false);
    }

    let Some(gate) = gate else {
        return whole_clause_segment(clause, false);
    };

    match gate.segment(&clause.text).await {
        Ok(response) if response.is_multi_indication && !response.segments.is_empty() => {
            from_fallback(clause, &response)
        }
        Ok(response) => {
            if response.is_multi_indication {
                // claimed multi-indication but returned no blocks
                warn!(
                    "Fallback returned no segments for clause {}, keeping whole clause",
                    clause.fingerprint
                );
                return whole_clause_segment(clause, true);
            }
            whole_clause_segment(clause, false)
        }
        Err(e) => {
            warn!(
                "Fallback failed for clause {}: {e}, keeping whole clause",
                clause.fingerprint
            );
            whole_clause_segment(clause, true)
        }
    }
}

/// Segments for every distinct clause, keyed by clause fingerprint
#[derive(Debug, Default)]
pub struct SegmentStore {
    segments: FxHashMap<Fingerprint, Vec<Segment>>,
}

impl SegmentStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a clause has already been segmented
    #[must_use]
    pub fn contains(&self, clause: &Fingerprint) -> bool {
        self.segments.contains_key(clause)
    }

    /// Record the segments of a clause; a second insert for the same
    /// clause is ignored
    pub fn insert(&mut self, clause: Fingerprint, segments: Vec<Segment>) {
        self.segments.entry(clause).or_insert(segments);
    }

    /// Segments of one clause
    #[must_use]
    pub fn get(&self, clause: &Fingerprint) -> Option<&[Segment]> {
        self.segments.get(clause).map(Vec::as_slice)
    }

    /// Mutable segments of one clause
    pub fn get_mut(&mut self, clause: &Fingerprint) -> Option<&mut Vec<Segment>> {
        self.segments.get_mut(clause)
    }

    /// Number of clauses with recorded segments
    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.segments.len()
    }

    /// Total number of segments across all clauses
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.values().map(Vec::len).sum()
    }

    /// Iterate over all segments in unspecified order
    pub fn iter_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values().flatten()
    }

    /// Iterate mutably over all segments
    pub fn iter_segments_mut(&mut self) -> impl Iterator<Item = &mut Segment> {
        self.segments.values_mut().flatten()
    }

    /// All segments sorted by clause fingerprint and ordinal
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<Segment> {
        let mut rows: Vec<Segment> = self.iter_segments().cloned().collect();
        rows.sort_by(|a, b| a.clause.cmp(&b.clause).then(a.ordinal.cmp(&b.ordinal)));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Occurrence, ProductId, SnapshotDate};

    fn clause(text: &str) -> Clause {
        Clause::new(
            fingerprint_text(text),
            text.to_string(),
            Occurrence {
                product: ProductId::from("P"),
                date: SnapshotDate::from_ym(2021, 6).unwrap(),
            },
        )
    }

    #[tokio::test]
    async fn marker_free_clause_without_fallback_stays_whole() {
        let c = clause("Behandlung ohne jede Hervorhebung.");
        let segments = segment_clause(&c, None).await;
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].origin, SegmentOrigin::WholeClause);
        assert!(!segments[0].needs_review);
    }

    #[tokio::test]
    async fn structural_split_skips_fallback() {
        let c = clause("<b>Indication A</b> text-a <b>Indication B</b> text-b");
        let segments = segment_clause(&c, None).await;
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.origin == SegmentOrigin::Structural));
    }

    #[test]
    fn store_insert_is_idempotent() {
        let c = clause("<b>Indication A</b> text-a");
        let segs = split_structural(&c).unwrap();
        let mut store = SegmentStore::new();
        store.insert(c.fingerprint.clone(), segs.clone());
        store.insert(c.fingerprint.clone(), Vec::new());
        assert_eq!(store.get(&c.fingerprint).unwrap().len(), segs.len());
        assert_eq!(store.clause_count(), 1);
    }

    #[test]
    fn fallback_segments_keep_suggested_names() {
        let c = clause("Prose about two diseases without markup.");
        let response = FallbackResponse {
            is_multi_indication: true,
            segments: vec![
                FallbackSegment {
                    text: "First disease part.".to_string(),
                    suggested_name: Some("First disease".to_string()),
                },
                FallbackSegment {
                    text: "Second disease part.".to_string(),
                    suggested_name: None,
                },
            ],
        };
        let segments = from_fallback(&c, &response);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].heading.as_deref(), Some("First disease"));
        assert_eq!(segments[1].ordinal, 1);
        assert!(segments.iter().all(|s| s.origin == SegmentOrigin::Fallback));
    }

    #[test]
    fn fallback_padding_does_not_change_segment_identity() {
        let c = clause("Prose about two diseases without markup.");
        let response = FallbackResponse {
            is_multi_indication: true,
            segments: vec![FallbackSegment {
                text: "  padded block text ".to_string(),
                suggested_name: None,
            }],
        };
        let segments = from_fallback(&c, &response);
        assert_eq!(segments[0].text, "padded block text");
        assert_eq!(segments[0].fingerprint, fingerprint_text(&segments[0].text));
        assert_eq!(segments[0].fingerprint, fingerprint_text("padded block text"));
    }
}
