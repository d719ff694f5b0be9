//! Validity intervals
//!
//! The snapshot date range during which a (product, code, segment text)
//! linkage held. An open end means the pair was still observed in the
//! most recent snapshot.

use super::clause::Fingerprint;
use super::dictionary::IndicationCode;
use super::snapshot::{ProductId, SnapshotDate};
use serde::{Deserialize, Serialize};

/// One validity interval for a (product, indication code) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityInterval {
    /// Product the rule applied to
    pub product: ProductId,
    /// Indication code the rule linked
    pub code: IndicationCode,
    /// Fingerprint of the segment text the rule carried
    pub segment: Fingerprint,
    /// First snapshot in which the pair was observed with this text
    pub start: SnapshotDate,
    /// Last snapshot in which it was observed, or `None` while in force
    pub end: Option<SnapshotDate>,
}

impl ValidityInterval {
    /// Whether the interval is still open (currently in force)
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Whether this interval overlaps another for the same pair
    ///
    /// Open ends are treated as extending beyond every known date.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let self_end_after = other.end.is_none_or(|e| self.start <= e);
        let other_end_after = self.end.is_none_or(|e| other.start <= e);
        self_end_after && other_end_after
    }
}
