//! Snapshot input types
//!
//! A snapshot is one immutable monthly extract of the registry: a date
//! plus a sequence of (product, raw clause text) entries. Snapshots are
//! supplied externally and never mutated by the engine.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque registry identifier for a product
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A snapshot date at monthly granularity
///
/// Always normalized to the first day of the month, so two dates within
/// the same month compare equal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SnapshotDate(NaiveDate);

impl SnapshotDate {
    /// Create a snapshot date, truncating to the first of the month
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Create a snapshot date from a year and month
    #[must_use]
    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The underlying date (first of the month)
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for SnapshotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.0.year(), self.0.month())
    }
}

/// One (product, raw clause text) pair within a snapshot
///
/// The optional product attributes feed the brand and cross-dossier
/// resolution strategies; entries without them still canonicalize and
/// resolve through the explicit/exact/fuzzy strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Product identifier
    pub product_id: ProductId,
    /// Raw limitation clause text as shipped in the registry extract
    pub text: String,
    /// Regulatory dossier number of the product, when declared
    #[serde(default)]
    pub dossier: Option<String>,
    /// Brand name, when declared
    #[serde(default)]
    pub brand: Option<String>,
    /// Active substance, when declared
    #[serde(default)]
    pub substance: Option<String>,
}

/// One immutable monthly registry extract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Extract date (monthly granularity)
    pub date: SnapshotDate,
    /// Per-product clause entries
    pub entries: Vec<SnapshotEntry>,
}
