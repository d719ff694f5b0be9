//! Canonicalized clause records
//!
//! A clause is a deduplicated unit of limitation text identified by a
//! content fingerprint. Clauses are append-only: new (product, date)
//! occurrences are recorded, the text itself is never edited.

use super::snapshot::{ProductId, SnapshotDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable content fingerprint of a normalized text
///
/// Hex-encoded SHA-256 of the folded form of the text. Two raw texts
/// differing only in whitespace, markup noise, case or diacritics share
/// a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-computed hex digest
    pub(crate) fn from_hex(hex: String) -> Self {
        Self(hex)
    }

    /// The digest as a hex string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Abbreviate for log lines; full digest via as_str()
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}

/// One observation of a clause in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    /// Product the clause was attached to
    pub product: ProductId,
    /// Snapshot in which it was observed
    pub date: SnapshotDate,
}

/// A canonicalized, deduplicated clause
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clause {
    /// Content fingerprint of the normalized text
    pub fingerprint: Fingerprint,
    /// Normalized text (structural markup retained)
    pub text: String,
    /// Every (product, snapshot) the clause was observed in
    pub occurrences: Vec<Occurrence>,
}

impl Clause {
    /// Create a clause with a single initial occurrence
    #[must_use]
    pub fn new(fingerprint: Fingerprint, text: String, occurrence: Occurrence) -> Self {
        Self {
            fingerprint,
            text,
            occurrences: vec![occurrence],
        }
    }

    /// Append an occurrence, ignoring exact duplicates
    pub fn add_occurrence(&mut self, occurrence: Occurrence) {
        if !self.occurrences.contains(&occurrence) {
            self.occurrences.push(occurrence);
        }
    }

    /// Products this clause has been attached to, deduplicated
    #[must_use]
    pub fn products(&self) -> Vec<&ProductId> {
        let mut seen: Vec<&ProductId> = Vec::new();
        for occ in &self.occurrences {
            if !seen.contains(&&occ.product) {
                seen.push(&occ.product);
            }
        }
        seen
    }
}
