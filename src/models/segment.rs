//! Per-indication text segments
//!
//! The segmenter slices each distinct clause into ordered segments, one
//! per indication block. Resolution fields are upgraded in later
//! reconciliation passes as the dictionary grows; an `Explicit`
//! resolution is terminal.

use super::clause::Fingerprint;
use super::dictionary::{ConfidenceTier, IndicationCode};
use super::snapshot::ProductId;
use serde::{Deserialize, Serialize};

/// How a segment's boundaries were determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentOrigin {
    /// Split at structural heading markers in the text
    Structural,
    /// Boundaries adopted from the external fallback segmenter
    Fallback,
    /// No marker found and no fallback answer; one segment spans the clause
    WholeClause,
}

/// Provenance of a segment's code resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum ResolutionSource {
    /// Code token embedded in the segment text itself
    EmbeddedCode,
    /// Exact normalized-name hit in the dictionary
    DictionaryName {
        /// Dictionary entry name that matched
        entry_name: String,
    },
    /// Approximate name match
    FuzzyName {
        /// Dictionary entry name that matched
        entry_name: String,
        /// Similarity score of the accepted match
        score: f64,
    },
    /// Brand-canonicalized name match
    BrandName {
        /// Dictionary entry name that matched after brand folding
        entry_name: String,
    },
    /// Propagated from a near-identical segment of a substance-family peer
    CrossDossier {
        /// Product whose explicit resolution was propagated
        donor: ProductId,
    },
}

/// A resolved (code, tier) assignment for a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Assigned indication code
    pub code: IndicationCode,
    /// Confidence tier of the assignment
    pub tier: ConfidenceTier,
    /// Where the assignment came from
    pub source: ResolutionSource,
}

/// A contiguous slice of a clause covering one indication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Fingerprint of the parent clause
    pub clause: Fingerprint,
    /// Position within the clause (0-based)
    pub ordinal: usize,
    /// Fingerprint of the segment text
    pub fingerprint: Fingerprint,
    /// Indication name heading the segment, when one was detected
    pub heading: Option<String>,
    /// Segment text
    pub text: String,
    /// How the boundaries were determined
    pub origin: SegmentOrigin,
    /// Flagged when segmentation was ambiguous and needs manual review
    pub needs_review: bool,
    /// Current code resolution, absent while unresolved
    pub resolution: Option<Resolution>,
}

impl Segment {
    /// Current confidence tier (`Unresolved` when no resolution is set)
    #[must_use]
    pub fn tier(&self) -> ConfidenceTier {
        self.resolution
            .as_ref()
            .map_or(ConfidenceTier::Unresolved, |r| r.tier)
    }

    /// Apply a resolution if it raises the confidence tier
    ///
    /// Returns true when the segment was upgraded. An existing
    /// `Explicit` resolution is never replaced, and a resolution is
    /// never downgraded or sideways-replaced at equal tier.
    pub fn try_upgrade(&mut self, candidate: Resolution) -> bool {
        if candidate.tier > self.tier() {
            self.resolution = Some(candidate);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> Segment {
        Segment {
            clause: Fingerprint::from_hex("c".into()),
            ordinal: 0,
            fingerprint: Fingerprint::from_hex("s".into()),
            heading: None,
            text: "text".into(),
            origin: SegmentOrigin::Structural,
            needs_review: false,
            resolution: None,
        }
    }

    fn resolution(tier: ConfidenceTier, code: &str) -> Resolution {
        Resolution {
            code: IndicationCode::new(code),
            tier,
            source: ResolutionSource::EmbeddedCode,
        }
    }

    #[test]
    fn upgrades_raise_tier_only() {
        let mut seg = segment();
        assert!(seg.try_upgrade(resolution(ConfidenceTier::Fuzzy, "1111.01")));
        assert!(!seg.try_upgrade(resolution(ConfidenceTier::Brand, "2222.01")));
        assert!(seg.try_upgrade(resolution(ConfidenceTier::Explicit, "3333.01")));
        assert_eq!(seg.tier(), ConfidenceTier::Explicit);
    }

    #[test]
    fn explicit_resolution_is_immutable() {
        let mut seg = segment();
        seg.try_upgrade(resolution(ConfidenceTier::Explicit, "1111.01"));
        assert!(!seg.try_upgrade(resolution(ConfidenceTier::Explicit, "9999.99")));
        assert_eq!(seg.resolution.unwrap().code.as_str(), "1111.01");
    }
}
