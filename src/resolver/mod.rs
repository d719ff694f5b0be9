//! Segment→code resolution
//!
//! Strategies are tried in descending confidence order and applied
//! through monotonic tier upgrades, so a pass can only raise a
//! segment's resolution. One pass visits every non-explicit segment;
//! the pipeline repeats passes until a fixpoint.

pub mod brand;
pub mod context;
pub mod cross_dossier;
pub mod exact;
pub mod explicit;
pub mod fuzzy;

pub use brand::{canonicalize_brands, resolve_brand};
pub use context::{ProductInfo, ResolutionContext};
pub use cross_dossier::{DonorIndex, resolve_cross_dossier};
pub use exact::resolve_exact;
pub use explicit::resolve_explicit;
pub use fuzzy::{name_similarity, resolve_fuzzy};

use crate::config::ResolverConfig;
use crate::dictionary::Dictionary;
use crate::models::{ConfidenceTier, Segment};
use crate::segmenter::SegmentStore;
use log::debug;
use rayon::prelude::*;

/// Runs resolution passes over the segment store
pub struct Resolver<'a> {
    config: &'a ResolverConfig,
    ctx: &'a ResolutionContext,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for one run's context
    #[must_use]
    pub const fn new(config: &'a ResolverConfig, ctx: &'a ResolutionContext) -> Self {
        Self { config, ctx }
    }

    /// One resolution pass; returns the number of upgraded segments
    pub fn resolve_pass(&self, segments: &mut SegmentStore, dict: &Dictionary) -> usize {
        let donors = DonorIndex::build(segments, self.ctx);

        let mut targets: Vec<&mut Segment> = segments
            .iter_segments_mut()
            .filter(|s| s.tier() != ConfidenceTier::Explicit)
            .collect();

        let resolve_one = |seg: &mut Segment| -> usize {
            let before = seg.tier();
            if let Some(r) = resolve_explicit(seg) {
                seg.try_upgrade(r);
            }
            if seg.tier() < ConfidenceTier::Explicit
                && let Some(r) = resolve_exact(seg, dict, self.ctx)
            {
                seg.try_upgrade(r);
            }
            if seg.tier() < ConfidenceTier::Fuzzy
                && let Some(r) = resolve_fuzzy(seg, dict, self.ctx, self.config)
            {
                seg.try_upgrade(r);
            }
            if seg.tier() < ConfidenceTier::Brand
                && let Some(r) = resolve_brand(seg, dict, self.ctx)
            {
                seg.try_upgrade(r);
            }
            if seg.tier() < ConfidenceTier::CrossDossier
                && let Some(r) = resolve_cross_dossier(seg, self.ctx, &donors)
            {
                seg.try_upgrade(r);
            }
            usize::from(seg.tier() > before)
        };

        let upgrades = if self.config.use_parallel && targets.len() >= self.config.parallel_threshold
        {
            targets
                .par_iter_mut()
                .map(|seg| resolve_one(seg))
                .sum()
        } else {
            targets.iter_mut().map(|seg| resolve_one(seg)).sum()
        };
        debug!("Resolution pass upgraded {upgrades} segments");
        upgrades
    }
}
