//! Append-only clause store
//!
//! One canonical `Clause` per fingerprint. Inserts are serialized
//! (single-writer discipline); canonicalization itself is a pure
//! function and safe to fan out across worker threads before merging.

use super::fingerprint::fingerprint_text;
use super::normalize::normalize_clause;
use crate::models::{Clause, Fingerprint, Occurrence, ProductId, SnapshotDate};
use rustc_hash::FxHashMap;

/// Canonicalize a raw clause without touching any store
///
/// Returns the normalized text and its fingerprint.
#[must_use]
pub fn canonicalize(raw: &str) -> (Fingerprint, String) {
    let text = normalize_clause(raw);
    let fingerprint = fingerprint_text(&text);
    (fingerprint, text)
}

/// Deduplicated store of canonical clauses, keyed by fingerprint
#[derive(Debug, Default)]
pub struct ClauseStore {
    clauses: FxHashMap<Fingerprint, Clause>,
}

impl ClauseStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize a raw clause and record its occurrence
    ///
    /// Returns the clause fingerprint, matching an existing clause when
    /// the normalized text was seen before.
    pub fn observe(&mut self, raw: &str, product: ProductId, date: SnapshotDate) -> Fingerprint {
        let (fingerprint, text) = canonicalize(raw);
        self.insert(fingerprint.clone(), text, Occurrence { product, date });
        fingerprint
    }

    /// Merge an already-canonicalized observation (single-writer entry point)
    pub fn insert(&mut self, fingerprint: Fingerprint, text: String, occurrence: Occurrence) {
        self.clauses
            .entry(fingerprint.clone())
            .and_modify(|c| c.add_occurrence(occurrence.clone()))
            .or_insert_with(|| Clause::new(fingerprint, text, occurrence));
    }

    /// Look up a clause by fingerprint
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Clause> {
        self.clauses.get(fingerprint)
    }

    /// Number of distinct clauses
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the store holds no clauses
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterate over all clauses in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.values()
    }

    /// All clauses sorted by fingerprint, for deterministic export
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<Clause> {
        let mut rows: Vec<Clause> = self.clauses.values().cloned().collect();
        rows.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32) -> SnapshotDate {
        SnapshotDate::from_ym(2020, month).unwrap()
    }

    #[test]
    fn whitespace_variants_share_a_clause() {
        let mut store = ClauseStore::new();
        let a = store.observe("Indication  A <br/> texte", ProductId::from("P1"), date(1));
        let b = store.observe("Indication A <br> texte", ProductId::from("P2"), date(2));
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&a).unwrap().occurrences.len(), 2);
    }

    #[test]
    fn re_observing_is_idempotent() {
        let mut store = ClauseStore::new();
        let fp = store.observe("texte", ProductId::from("P1"), date(1));
        store.observe("texte", ProductId::from("P1"), date(1));
        assert_eq!(store.get(&fp).unwrap().occurrences.len(), 1);
    }

    #[test]
    fn empty_clause_is_accepted() {
        let mut store = ClauseStore::new();
        let fp = store.observe("", ProductId::from("P1"), date(1));
        assert_eq!(store.get(&fp).unwrap().text, "");
    }
}
