//! Dictionary construction from co-located names and codes
//!
//! Three evidence shapes produce explicit entries:
//! 1. a code announced next to a named segment,
//! 2. a single-segment clause containing exactly one code,
//! 3. a clause whose distinct same-dossier codes match its segment
//!    count one-to-one, paired in ordinal order against the codes
//!    sorted by indication part.
//!
//! A later absorb pass feeds explicitly resolved segments back into the
//! dictionary so reconciliation can converge.

use super::Dictionary;
use super::patterns::{distinct_codes, extract_announced_codes};
use crate::canonical::{ClauseStore, normalize_name, strip_markup};
use crate::models::{
    Clause, ConfidenceTier, EntryEvidence, IndicationCode, ProductId, SnapshotDate,
};
use crate::segmenter::SegmentStore;
use log::debug;
use rustc_hash::FxHashMap;

/// Counts of evidence found during one dictionary scan
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanStats {
    /// Entries evidenced by an announcement phrase
    pub announced: usize,
    /// Entries from single-segment clauses with a single code
    pub single_segment: usize,
    /// Entries from ordinal code/segment pairing
    pub ordinal: usize,
    /// Entries absorbed from explicitly resolved segments
    pub absorbed: usize,
}

/// Scans clauses and segments for name/code co-location evidence
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    stats: ScanStats,
}

impl DictionaryBuilder {
    /// Create a builder with zeroed counters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters accumulated so far
    #[must_use]
    pub const fn stats(&self) -> ScanStats {
        self.stats
    }

    /// One scan over all clauses; returns true when the dictionary
    /// gained a mapping or a tier raise
    pub fn scan(
        &mut self,
        clauses: &ClauseStore,
        segments: &SegmentStore,
        dict: &mut Dictionary,
    ) -> bool {
        let mut changed = false;
        for clause in clauses.iter() {
            let Some(segs) = segments.get(&clause.fingerprint) else {
                continue;
            };
            let evidence = first_evidence_per_product(clause);
            let plain = strip_markup(&clause.text);

            // Shape 1: announced code inside a named segment
            for seg in segs {
                let Some(name) = seg.heading.as_deref().map(normalize_name) else {
                    continue;
                };
                let announced = extract_announced_codes(&strip_markup(&seg.text));
                if let [code] = announced.as_slice()
                    && self.add_all(dict, &name, code, &evidence, clause)
                {
                    changed = true;
                    self.stats.announced += 1;
                }
            }

            let codes = distinct_codes(&plain);

            // Shape 2: one segment, one code
            if let ([seg], [code]) = (segs, codes.as_slice())
                && let Some(name) = seg.heading.as_deref().map(normalize_name)
                && self.add_all(dict, &name, code, &evidence, clause)
            {
                changed = true;
                self.stats.single_segment += 1;
            }

            // Shape 3: N same-dossier codes against N segments
            if segs.len() > 1 && codes.len() == segs.len() && same_dossier(&codes) {
                let mut ordered = codes.clone();
                ordered.sort_by(|a, b| a.indication_part().cmp(&b.indication_part()));
                for (seg, code) in segs.iter().zip(&ordered) {
                    let Some(name) = seg.heading.as_deref().map(normalize_name) else {
                        continue;
                    };
                    if self.add_all(dict, &name, code, &evidence, clause) {
                        changed = true;
                        self.stats.ordinal += 1;
                    }
                }
            }
        }
        changed
    }

    /// Feed explicitly resolved segment headings back into the dictionary
    pub fn absorb_resolutions(
        &mut self,
        clauses: &ClauseStore,
        segments: &SegmentStore,
        dict: &mut Dictionary,
    ) -> bool {
        let mut changed = false;
        for seg in segments.iter_segments() {
            let Some(resolution) = &seg.resolution else {
                continue;
            };
            if resolution.tier != ConfidenceTier::Explicit {
                continue;
            }
            let Some(name) = seg.heading.as_deref().map(normalize_name) else {
                continue;
            };
            let Some(clause) = clauses.get(&seg.clause) else {
                continue;
            };
            let evidence = first_evidence_per_product(clause);
            if self.add_all(dict, &name, &resolution.code, &evidence, clause) {
                debug!("Absorbed resolved segment heading '{name}' -> {}", resolution.code);
                changed = true;
                self.stats.absorbed += 1;
            }
        }
        changed
    }

    fn add_all(
        &mut self,
        dict: &mut Dictionary,
        name: &str,
        code: &IndicationCode,
        evidence: &FxHashMap<ProductId, SnapshotDate>,
        clause: &Clause,
    ) -> bool {
        let mut changed = false;
        for (product, date) in evidence {
            let ev = EntryEvidence {
                product: product.clone(),
                date: *date,
                clause: clause.fingerprint.clone(),
            };
            if dict.add(name, code.clone(), ConfidenceTier::Explicit, ev) {
                changed = true;
            }
        }
        changed
    }
}

fn first_evidence_per_product(clause: &Clause) -> FxHashMap<ProductId, SnapshotDate> {
    let mut map: FxHashMap<ProductId, SnapshotDate> = FxHashMap::default();
    for occurrence in &clause.occurrences {
        map.entry(occurrence.product.clone())
            .and_modify(|d| {
                if occurrence.date < *d {
                    *d = occurrence.date;
                }
            })
            .or_insert(occurrence.date);
    }
    map
}

fn same_dossier(codes: &[IndicationCode]) -> bool {
    let mut parts = codes.iter().map(IndicationCode::dossier_part);
    let Some(first) = parts.next() else {
        return false;
    };
    first.is_some() && parts.all(|p| p == first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnapshotDate;
    use crate::segmenter::split_structural;

    fn observe(store: &mut ClauseStore, text: &str, product: &str) -> crate::models::Fingerprint {
        store.observe(
            text,
            ProductId::from(product),
            SnapshotDate::from_ym(2021, 3).unwrap(),
        )
    }

    fn segment_all(clauses: &ClauseStore) -> SegmentStore {
        let mut segments = SegmentStore::new();
        for clause in clauses.iter() {
            let segs = split_structural(clause)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| crate::segmenter::whole_clause_segment(clause, false));
            segments.insert(clause.fingerprint.clone(), segs);
        }
        segments
    }

    #[test]
    fn announced_code_builds_entry() {
        let mut clauses = ClauseStore::new();
        observe(
            &mut clauses,
            "<b>Morbus Crohn</b> Vergütung unter folgendem Indikationscode: 2101.03",
            "P1",
        );
        let segments = segment_all(&clauses);
        let mut dict = Dictionary::new();
        let mut builder = DictionaryBuilder::new();
        assert!(builder.scan(&clauses, &segments, &mut dict));

        let entry = dict.lookup("morbus crohn", None, None).unwrap();
        assert_eq!(entry.code.as_str(), "2101.03");
        assert_eq!(entry.tier, ConfidenceTier::Explicit);
    }

    #[test]
    fn single_segment_single_code_pairing() {
        let mut clauses = ClauseStore::new();
        observe(&mut clauses, "<b>Psoriasis</b> Behandlung gemäss 1111.02.", "P1");
        let segments = segment_all(&clauses);
        let mut dict = Dictionary::new();
        DictionaryBuilder::new().scan(&clauses, &segments, &mut dict);

        assert_eq!(
            dict.lookup("psoriasis", None, None).unwrap().code.as_str(),
            "1111.02"
        );
    }

    #[test]
    fn ordinal_pairing_sorts_codes_by_indication_part() {
        let mut clauses = ClauseStore::new();
        // codes appear out of order in the text; pairing follows the
        // sorted indication parts against segment order
        observe(
            &mut clauses,
            "<b>Alpha</b> erste Indikation 4444.02 <b>Beta</b> zweite Indikation 4444.01",
            "P1",
        );
        let segments = segment_all(&clauses);
        let mut dict = Dictionary::new();
        DictionaryBuilder::new().scan(&clauses, &segments, &mut dict);

        assert_eq!(dict.lookup("alpha", None, None).unwrap().code.as_str(), "4444.01");
        assert_eq!(dict.lookup("beta", None, None).unwrap().code.as_str(), "4444.02");
    }

    #[test]
    fn mixed_dossier_codes_are_not_ordinal_paired() {
        let mut clauses = ClauseStore::new();
        observe(
            &mut clauses,
            "<b>Alpha</b> erste 4444.01 <b>Beta</b> zweite 5555.02",
            "P1",
        );
        let segments = segment_all(&clauses);
        let mut dict = Dictionary::new();
        DictionaryBuilder::new().scan(&clauses, &segments, &mut dict);

        assert!(dict.lookup("alpha", None, None).is_none());
        assert!(dict.lookup("beta", None, None).is_none());
    }

    #[test]
    fn rescan_converges() {
        let mut clauses = ClauseStore::new();
        observe(&mut clauses, "<b>Psoriasis</b> Behandlung gemäss 1111.02.", "P1");
        let segments = segment_all(&clauses);
        let mut dict = Dictionary::new();
        let mut builder = DictionaryBuilder::new();
        assert!(builder.scan(&clauses, &segments, &mut dict));
        assert!(!builder.scan(&clauses, &segments, &mut dict));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn rescan_does_not_inflate_shape_counters() {
        let mut clauses = ClauseStore::new();
        observe(&mut clauses, "<b>Psoriasis</b> Behandlung gemäss 1111.02.", "P1");
        let segments = segment_all(&clauses);
        let mut dict = Dictionary::new();
        let mut builder = DictionaryBuilder::new();

        builder.scan(&clauses, &segments, &mut dict);
        assert_eq!(builder.stats().single_segment, 1);
        builder.scan(&clauses, &segments, &mut dict);
        assert_eq!(builder.stats().single_segment, 1);
        assert_eq!(builder.stats().announced, 0);
        assert_eq!(builder.stats().ordinal, 0);
    }
}
