//! Indication codes and dictionary entries
//!
//! The dictionary maps normalized indication names to regulatory codes.
//! Conflicting mappings for the same name are all retained with their
//! confidence tiers; downstream lookup applies the locality tie-break.

use super::clause::Fingerprint;
use super::snapshot::{ProductId, SnapshotDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An external regulatory indication code of the form `DDDD.II`
///
/// The four-digit dossier part identifies the product dossier, the
/// two-digit indication part the disease indication within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicationCode(String);

impl IndicationCode {
    /// Wrap a code token as matched by the code-shaped pattern
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Build a code from a dossier part and an indication part
    #[must_use]
    pub fn from_parts(dossier: &str, indication: &str) -> Self {
        Self(format!("{dossier}.{indication}"))
    }

    /// The code as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dossier part before the dot, if the code has one
    #[must_use]
    pub fn dossier_part(&self) -> Option<&str> {
        self.0.split_once('.').map(|(d, _)| d)
    }

    /// The indication part after the dot, if the code has one
    #[must_use]
    pub fn indication_part(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, i)| i)
    }
}

impl fmt::Display for IndicationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Confidence tier of a name→code mapping or a segment resolution
///
/// Ordered by confidence: resolution updates may only move up this
/// ordering, and `Explicit` is immutable once set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceTier {
    /// No resolution found yet
    Unresolved,
    /// Inferred from another product in the same substance family
    CrossDossier,
    /// Inferred via brand/substance canonicalization
    Brand,
    /// Inferred by approximate string match
    Fuzzy,
    /// Seen co-located with the code in at least one clause
    Explicit,
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unresolved => "unresolved",
            Self::CrossDossier => "cross-dossier",
            Self::Brand => "brand",
            Self::Fuzzy => "fuzzy",
            Self::Explicit => "explicit",
        };
        f.write_str(s)
    }
}

/// Where a dictionary entry was evidenced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryEvidence {
    /// Product whose clause provided the evidence
    pub product: ProductId,
    /// Snapshot date of the evidencing occurrence
    pub date: SnapshotDate,
    /// Clause the evidence came from
    pub clause: Fingerprint,
}

/// One (name, code) mapping with its confidence tier and evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Normalized indication name
    pub name: String,
    /// Mapped indication code
    pub code: IndicationCode,
    /// Confidence tier of the mapping
    pub tier: ConfidenceTier,
    /// Dossier the evidencing product belonged to, when known
    pub dossier: Option<String>,
    /// Evidencing occurrences (first kept per distinct product)
    pub evidence: Vec<EntryEvidence>,
    /// Number of times the mapping was observed across all products
    pub observations: u32,
}

impl DictionaryEntry {
    /// Whether any evidence comes from the given product
    #[must_use]
    pub fn evidenced_by(&self, product: &ProductId) -> bool {
        self.evidence.iter().any(|e| &e.product == product)
    }
}
