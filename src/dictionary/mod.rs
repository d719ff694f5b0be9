//! Name→code dictionary
//!
//! Built from clauses where an indication name and a code co-occur.
//! Conflicting mappings for one name are all retained; `lookup` applies
//! the locality tie-break (same product, then same dossier, then most
//! observed) and refuses to guess when no discriminator remains.

pub mod builder;
pub mod patterns;

pub use builder::{DictionaryBuilder, ScanStats};
pub use patterns::{distinct_codes, extract_announced_codes, extract_codes};

use crate::models::{ConfidenceTier, DictionaryEntry, EntryEvidence, IndicationCode, ProductId};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Conflict-retaining dictionary of name→code mappings
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    by_name: FxHashMap<String, SmallVec<[usize; 2]>>,
}

impl Dictionary {
    /// Create an empty dictionary
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one evidenced (name, code) mapping
    ///
    /// An existing entry for the pair absorbs the evidence and is
    /// raised to the higher tier. Returns true when the dictionary
    /// changed in a way later lookups can observe: a new mapping or a
    /// tier raise.
    pub fn add(
        &mut self,
        name: &str,
        code: IndicationCode,
        tier: ConfidenceTier,
        evidence: EntryEvidence,
    ) -> bool {
        if name.is_empty() {
            return false;
        }
        if let Some(indices) = self.by_name.get(name) {
            for &i in indices {
                let entry = &mut self.entries[i];
                if entry.code == code {
                    entry.observations += 1;
                    if !entry.evidenced_by(&evidence.product) {
                        entry.evidence.push(evidence);
                    }
                    if tier > entry.tier {
                        entry.tier = tier;
                        return true;
                    }
                    return false;
                }
            }
        }
        let dossier = code.dossier_part().map(str::to_string);
        self.entries.push(DictionaryEntry {
            name: name.to_string(),
            code,
            tier,
            dossier,
            evidence: vec![evidence],
            observations: 1,
        });
        let index = self.entries.len() - 1;
        self.by_name.entry(name.to_string()).or_default().push(index);
        true
    }

    /// All entries recorded for a name
    #[must_use]
    pub fn entries_for(&self, name: &str) -> Vec<&DictionaryEntry> {
        self.by_name
            .get(name)
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Whether a name maps to more than one distinct code
    #[must_use]
    pub fn is_ambiguous(&self, name: &str) -> bool {
        let entries = self.entries_for(name);
        entries
            .iter()
            .any(|e| e.code != entries[0].code)
    }

    /// Resolve a name for a product context
    ///
    /// Unambiguous names resolve directly. For conflicting names the
    /// tie-break prefers entries evidenced by the same product, then
    /// entries from the same dossier, then the most observed mapping;
    /// if no strict winner remains the name stays unresolved.
    #[must_use]
    pub fn lookup(
        &self,
        name: &str,
        product: Option<&ProductId>,
        dossier: Option<&str>,
    ) -> Option<&DictionaryEntry> {
        let mut candidates = self.entries_for(name);
        if candidates.is_empty() {
            return None;
        }
        if candidates.iter().all(|e| e.code == candidates[0].code) {
            return candidates.into_iter().max_by_key(|e| (e.tier, e.observations));
        }

        if let Some(product) = product {
            let local: Vec<&DictionaryEntry> = candidates
                .iter()
                .copied()
                .filter(|e| e.evidenced_by(product))
                .collect();
            if !local.is_empty() {
                candidates = local;
            }
        }
        if candidates.iter().any(|e| e.code != candidates[0].code)
            && let Some(dossier) = dossier
        {
            let same_dossier: Vec<&DictionaryEntry> = candidates
                .iter()
                .copied()
                .filter(|e| e.dossier.as_deref() == Some(dossier))
                .collect();
            if !same_dossier.is_empty() {
                candidates = same_dossier;
            }
        }
        if candidates.iter().all(|e| e.code == candidates[0].code) {
            return candidates.into_iter().max_by_key(|e| (e.tier, e.observations));
        }

        // still conflicting: accept only a strict observation-count winner
        candidates.sort_by(|a, b| b.observations.cmp(&a.observations));
        if candidates[0].observations > candidates[1].observations {
            Some(candidates[0])
        } else {
            None
        }
    }

    /// Names that map to more than one distinct code
    #[must_use]
    pub fn ambiguous_names(&self) -> Vec<&str> {
        self.by_name
            .keys()
            .filter(|n| self.is_ambiguous(n))
            .map(String::as_str)
            .sorted_unstable()
            .collect()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.iter()
    }

    /// All entries sorted by name then code, for deterministic export
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<DictionaryEntry> {
        let mut rows = self.entries.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::fingerprint_text;
    use crate::models::SnapshotDate;

    fn evidence(product: &str) -> EntryEvidence {
        EntryEvidence {
            product: ProductId::from(product),
            date: SnapshotDate::from_ym(2020, 1).unwrap(),
            clause: fingerprint_text(product),
        }
    }

    fn code(s: &str) -> IndicationCode {
        IndicationCode::new(s)
    }

    #[test]
    fn same_pair_is_merged_not_duplicated() {
        let mut dict = Dictionary::new();
        assert!(dict.add("morbus crohn", code("1234.01"), ConfidenceTier::Explicit, evidence("P1")));
        assert!(!dict.add("morbus crohn", code("1234.01"), ConfidenceTier::Explicit, evidence("P2")));
        assert_eq!(dict.len(), 1);
        let entry = dict.lookup("morbus crohn", None, None).unwrap();
        assert_eq!(entry.observations, 2);
        assert_eq!(entry.evidence.len(), 2);
    }

    #[test]
    fn conflicting_codes_are_both_retained() {
        let mut dict = Dictionary::new();
        dict.add("psoriasis", code("1111.01"), ConfidenceTier::Explicit, evidence("P1"));
        dict.add("psoriasis", code("2222.03"), ConfidenceTier::Explicit, evidence("P2"));
        assert_eq!(dict.len(), 2);
        assert!(dict.is_ambiguous("psoriasis"));
        assert_eq!(dict.ambiguous_names(), vec!["psoriasis"]);
    }

    #[test]
    fn ambiguous_name_resolves_through_product_locality() {
        let mut dict = Dictionary::new();
        dict.add("psoriasis", code("1111.01"), ConfidenceTier::Explicit, evidence("P1"));
        dict.add("psoriasis", code("2222.03"), ConfidenceTier::Explicit, evidence("P2"));
        let entry = dict
            .lookup("psoriasis", Some(&ProductId::from("P2")), None)
            .unwrap();
        assert_eq!(entry.code.as_str(), "2222.03");
    }

    #[test]
    fn ambiguous_name_resolves_through_dossier_locality() {
        let mut dict = Dictionary::new();
        dict.add("psoriasis", code("1111.01"), ConfidenceTier::Explicit, evidence("P1"));
        dict.add("psoriasis", code("2222.03"), ConfidenceTier::Explicit, evidence("P2"));
        let entry = dict
            .lookup("psoriasis", Some(&ProductId::from("P9")), Some("2222"))
            .unwrap();
        assert_eq!(entry.code.as_str(), "2222.03");
    }

    #[test]
    fn ambiguous_name_without_discriminator_stays_unresolved() {
        let mut dict = Dictionary::new();
        dict.add("psoriasis", code("1111.01"), ConfidenceTier::Explicit, evidence("P1"));
        dict.add("psoriasis", code("2222.03"), ConfidenceTier::Explicit, evidence("P2"));
        assert!(dict.lookup("psoriasis", Some(&ProductId::from("P9")), None).is_none());
    }

    #[test]
    fn tier_raise_reports_change() {
        let mut dict = Dictionary::new();
        dict.add("colite", code("3333.02"), ConfidenceTier::Fuzzy, evidence("P1"));
        assert!(dict.add("colite", code("3333.02"), ConfidenceTier::Explicit, evidence("P1")));
        assert_eq!(dict.lookup("colite", None, None).unwrap().tier, ConfidenceTier::Explicit);
    }
}
