//! Brand-name resolution
//!
//! Headings sometimes name the brand ("Remicade bei Morbus Crohn")
//! where the dictionary entry names the substance, typically between an
//! originator and its biosimilars. Folding brand tokens to their
//! substance makes such names comparable; a same-dossier hit resolves
//! directly, a cross-dossier hit synthesizes a local code when the
//! indication part is unambiguous.

use super::context::ResolutionContext;
use crate::canonical::normalize_name;
use crate::dictionary::Dictionary;
use crate::models::{ConfidenceTier, IndicationCode, Resolution, ResolutionSource, Segment};

/// Brand token to substance token, originators and biosimilars alike
const BRAND_CANONICAL: &[(&str, &str)] = &[
    ("remicade", "infliximab"),
    ("inflectra", "infliximab"),
    ("remsima", "infliximab"),
    ("zessly", "infliximab"),
    ("humira", "adalimumab"),
    ("amgevita", "adalimumab"),
    ("hyrimoz", "adalimumab"),
    ("idacio", "adalimumab"),
    ("imraldi", "adalimumab"),
    ("enbrel", "etanercept"),
    ("erelzi", "etanercept"),
    ("mabthera", "rituximab"),
    ("rixathon", "rituximab"),
    ("truxima", "rituximab"),
    ("herceptin", "trastuzumab"),
    ("herzuma", "trastuzumab"),
    ("kanjinti", "trastuzumab"),
    ("ogivri", "trastuzumab"),
    ("avastin", "bevacizumab"),
    ("mvasi", "bevacizumab"),
    ("zirabev", "bevacizumab"),
    ("neulasta", "pegfilgrastim"),
    ("pelgraz", "pegfilgrastim"),
    ("ziextenzo", "pegfilgrastim"),
    ("lantus", "insulin glargin"),
    ("abasaglar", "insulin glargin"),
];

/// Replace brand tokens in a folded name with their substance
#[must_use]
pub fn canonicalize_brands(folded_name: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for word in folded_name.split_whitespace() {
        match BRAND_CANONICAL.iter().find(|(brand, _)| *brand == word) {
            Some((_, substance)) => out.push((*substance).to_string()),
            None => out.push(word.to_string()),
        }
    }
    out.join(" ")
}

/// Resolve a segment whose heading matches an entry after brand folding
#[must_use]
pub fn resolve_brand(
    segment: &Segment,
    dict: &Dictionary,
    ctx: &ResolutionContext,
) -> Option<Resolution> {
    let name = normalize_name(segment.heading.as_deref()?);
    let canonical = canonicalize_brands(&name);
    let local_dossier = ctx.clause_dossier(&segment.clause);

    let matches: Vec<&crate::models::DictionaryEntry> = dict
        .iter()
        .filter(|entry| entry.tier == ConfidenceTier::Explicit)
        .filter(|entry| entry.name != name && canonicalize_brands(&entry.name) == canonical)
        .collect();
    if matches.is_empty() {
        return None;
    }

    // same-dossier entry wins outright
    if let Some(local) = local_dossier
        && let Some(entry) = matches.iter().find(|e| e.dossier.as_deref() == Some(local))
    {
        return Some(Resolution {
            code: entry.code.clone(),
            tier: ConfidenceTier::Brand,
            source: ResolutionSource::BrandName {
                entry_name: entry.name.clone(),
            },
        });
    }

    // cross-dossier: synthesize a local code only when every match
    // agrees on the indication part
    let local = local_dossier?;
    let part = matches[0].code.indication_part()?;
    if !matches
        .iter()
        .all(|e| e.code.indication_part() == Some(part))
    {
        return None;
    }
    Some(Resolution {
        code: IndicationCode::from_parts(local, part),
        tier: ConfidenceTier::Brand,
        source: ResolutionSource::BrandName {
            entry_name: matches[0].name.clone(),
        },
    })
}
