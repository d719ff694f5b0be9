//! Embedded-code resolution
//!
//! A segment whose own text carries exactly one code is resolved from
//! that code directly. An announced code outranks bare tokens: when an
//! announcement phrase is present, only announced codes count.

use crate::canonical::strip_markup;
use crate::dictionary::{distinct_codes, extract_announced_codes};
use crate::models::{ConfidenceTier, Resolution, ResolutionSource, Segment};

/// Resolve a segment from a code embedded in its text
#[must_use]
pub fn resolve_explicit(segment: &Segment) -> Option<Resolution> {
    let plain = strip_markup(&segment.text);
    let announced = extract_announced_codes(&plain);
    let code = match announced.as_slice() {
        [code] => code.clone(),
        [_, _, ..] => return None,
        [] => match distinct_codes(&plain).as_slice() {
            [code] => code.clone(),
            _ => return None,
        },
    };
    Some(Resolution {
        code,
        tier: ConfidenceTier::Explicit,
        source: ResolutionSource::EmbeddedCode,
    })
}
