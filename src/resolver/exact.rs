//! Exact dictionary-name resolution
//!
//! The segment heading, normalized, is looked up in the dictionary with
//! the clause's product and dossier as locality tie-breaks. The
//! resolution inherits the tier of the matched entry.

use super::context::ResolutionContext;
use crate::canonical::normalize_name;
use crate::dictionary::Dictionary;
use crate::models::{Resolution, ResolutionSource, Segment};

/// Resolve a segment by exact normalized-name match
#[must_use]
pub fn resolve_exact(
    segment: &Segment,
    dict: &Dictionary,
    ctx: &ResolutionContext,
) -> Option<Resolution> {
    let name = normalize_name(segment.heading.as_deref()?);
    if name.is_empty() {
        return None;
    }
    let product = ctx.sole_product(&segment.clause);
    let dossier = ctx.clause_dossier(&segment.clause);
    let entry = dict.lookup(&name, product, dossier)?;
    Some(Resolution {
        code: entry.code.clone(),
        tier: entry.tier,
        source: ResolutionSource::DictionaryName {
            entry_name: entry.name.clone(),
        },
    })
}
