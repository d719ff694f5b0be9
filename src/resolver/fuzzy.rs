//! Approximate name resolution
//!
//! Headings drift across snapshots (reordered qualifiers, small
//! spelling edits) without changing the indication. A segment heading
//! is compared against explicit dictionary names from the same dossier
//! using normalized Levenshtein similarity over token-sorted names. A
//! match is accepted only above the similarity threshold with a clear
//! margin over the runner-up; near-identical prefixes relax the margin
//! at a higher threshold.

use super::context::ResolutionContext;
use crate::canonical::{normalize_name, token_sorted};
use crate::config::ResolverConfig;
use crate::dictionary::Dictionary;
use crate::models::{ConfidenceTier, DictionaryEntry, Resolution, ResolutionSource, Segment};
use strsim::normalized_levenshtein;

/// Similarity between two normalized names, word order ignored
#[must_use]
pub fn name_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&token_sorted(a), &token_sorted(b))
}

/// Resolve a segment by approximate heading match
#[must_use]
pub fn resolve_fuzzy(
    segment: &Segment,
    dict: &Dictionary,
    ctx: &ResolutionContext,
    config: &ResolverConfig,
) -> Option<Resolution> {
    let name = normalize_name(segment.heading.as_deref()?);
    if name.is_empty() {
        return None;
    }
    // Candidates are explicit entries from the clause's own dossier.
    // Without a known dossier there are no fuzzy candidates; matching
    // across dossiers is left to the brand and cross-dossier
    // strategies, which carry weaker tiers.
    let dossier = ctx.clause_dossier(&segment.clause)?;
    let mut scored: Vec<(f64, &DictionaryEntry)> = dict
        .iter()
        .filter(|entry| entry.tier == ConfidenceTier::Explicit)
        .filter(|entry| entry.dossier.as_deref() == Some(dossier) && entry.name != name)
        .map(|entry| (name_similarity(&name, &entry.name), entry))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let (score, entry) = *scored.first()?;
    // runner-up similarity among entries that would pick a different code
    let second = scored
        .iter()
        .find(|(_, e)| e.code != entry.code)
        .map_or(0.0, |(s, _)| *s);
    let plain_accept =
        score >= config.fuzzy_accept_threshold && score - second >= config.fuzzy_margin;
    let prefix_accept = score >= config.fuzzy_prefix_threshold
        && (name.starts_with(&entry.name) || entry.name.starts_with(&name));
    if !(plain_accept || prefix_accept) {
        return None;
    }

    Some(Resolution {
        code: entry.code.clone(),
        tier: ConfidenceTier::Fuzzy,
        source: ResolutionSource::FuzzyName {
            entry_name: entry.name.clone(),
            score,
        },
    })
}
