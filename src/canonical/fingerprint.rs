//! Content fingerprints
//!
//! SHA-256 over the folded form of a normalized text, hex-encoded. The
//! fingerprint is the cross-snapshot identity of a clause or segment.

use super::normalize::fold_text;
use crate::models::Fingerprint;
use sha2::{Digest, Sha256};

/// Fingerprint an already-normalized text
///
/// Pure and stable: `fingerprint_text(t) == fingerprint_text(t)` across
/// runs, and folding first makes accent/case-only variants collide.
#[must_use]
pub fn fingerprint_text(normalized: &str) -> Fingerprint {
    let folded = fold_text(normalized);
    let digest = Sha256::digest(folded.as_bytes());
    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    Fingerprint::from_hex(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::normalize::normalize_clause;

    #[test]
    fn fingerprint_is_stable() {
        let a = fingerprint_text("some clause text");
        let b = fingerprint_text("some clause text");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_ignores_case_and_accents() {
        assert_eq!(
            fingerprint_text("Insuffisance Rénale"),
            fingerprint_text("insuffisance renale")
        );
    }

    #[test]
    fn normalize_then_fingerprint_matches_raw_variant() {
        let raw = "Indication&nbsp;A  <br/> texte";
        let clean = "Indication A <br> texte";
        assert_eq!(
            fingerprint_text(&normalize_clause(raw)),
            fingerprint_text(&normalize_clause(clean))
        );
    }

    #[test]
    fn empty_text_has_a_fingerprint() {
        assert_eq!(fingerprint_text("").as_str().len(), 64);
    }
}
