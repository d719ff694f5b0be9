//! Cross-dossier resolution
//!
//! Biosimilars carry clauses lifted almost verbatim from the
//! originator, but file under their own dossier and therefore their own
//! codes. When a segment's folded text matches an explicitly resolved
//! segment of a substance-family peer in another dossier, the donor's
//! indication part is grafted onto the local dossier. The graft is only
//! taken when every donor agrees on the indication part.

use super::context::ResolutionContext;
use crate::models::{
    ConfidenceTier, Fingerprint, IndicationCode, ProductId, Resolution, ResolutionSource, Segment,
};
use crate::segmenter::SegmentStore;
use rustc_hash::FxHashMap;

/// Explicitly resolved segments, indexed by segment fingerprint
#[derive(Debug, Default)]
pub struct DonorIndex {
    by_fingerprint: FxHashMap<Fingerprint, Vec<(IndicationCode, ProductId)>>,
}

impl DonorIndex {
    /// Collect all explicit resolutions with their owning products
    #[must_use]
    pub fn build(segments: &SegmentStore, ctx: &ResolutionContext) -> Self {
        let mut by_fingerprint: FxHashMap<Fingerprint, Vec<(IndicationCode, ProductId)>> =
            FxHashMap::default();
        for seg in segments.iter_segments() {
            let Some(resolution) = &seg.resolution else {
                continue;
            };
            if resolution.tier != ConfidenceTier::Explicit {
                continue;
            }
            for product in ctx.products_of_clause(&seg.clause) {
                by_fingerprint
                    .entry(seg.fingerprint.clone())
                    .or_default()
                    .push((resolution.code.clone(), product.clone()));
            }
        }
        Self { by_fingerprint }
    }

    fn donors(&self, fingerprint: &Fingerprint) -> Option<&[(IndicationCode, ProductId)]> {
        self.by_fingerprint.get(fingerprint).map(Vec::as_slice)
    }
}

/// Resolve a segment from a family peer's identical segment
#[must_use]
pub fn resolve_cross_dossier(
    segment: &Segment,
    ctx: &ResolutionContext,
    donors: &DonorIndex,
) -> Option<Resolution> {
    let local_dossier = ctx.clause_dossier(&segment.clause)?;
    let owners = ctx.products_of_clause(&segment.clause);
    let candidates = donors.donors(&segment.fingerprint)?;

    let viable: Vec<&(IndicationCode, ProductId)> = candidates
        .iter()
        .filter(|(_, donor)| ctx.dossier_of(donor) != Some(local_dossier))
        .filter(|(_, donor)| owners.iter().any(|o| ctx.same_family(o, donor)))
        .collect();
    let (first_code, donor) = viable.first()?;

    let part = first_code.indication_part()?;
    if !viable
        .iter()
        .all(|(code, _)| code.indication_part() == Some(part))
    {
        return None;
    }

    Some(Resolution {
        code: IndicationCode::from_parts(local_dossier, part),
        tier: ConfidenceTier::CrossDossier,
        source: ResolutionSource::CrossDossier {
            donor: donor.clone(),
        },
    })
}
