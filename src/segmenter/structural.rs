//! Structural segmentation of multi-indication clauses
//!
//! Registry clauses introduce each indication block with a bold heading.
//! Paragraph-anchored headings (at the start of the text or after a
//! paragraph break) are the reliable marker; when a clause has none but
//! does carry inline bold runs, those are used instead so older
//! single-line formattings still split. Connectives and other structural
//! bold tokens are never treated as indication headings.

use crate::canonical::{fingerprint_text, strip_markup};
use crate::models::{Clause, Segment, SegmentOrigin};
use regex::Regex;
use std::sync::LazyLock;

static RE_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<b>(.+?)</b>").unwrap());
static RE_HEADER_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|<br>\s*(?:<br>\s*)*)(<b>.+?</b>)").unwrap());

/// Bold tokens that join blocks rather than naming an indication
const STRUCTURAL_NAMES: &[&str] = &[
    "UND", "ODER", "AND", "OR", "ET", "OU", "und", "oder", "and", "or", "et", "ou",
];

/// Heading prefixes marking therapy-phase or pricing blocks, not indications
const STRUCTURAL_PREFIXES: &[&str] = &[
    "Vor Therapiebeginn",
    "Therapiefortführung",
    "Therapiefortsetzung",
    "Therapieabbruch",
    "nach AJCC",
    "Fr. ",
    "CHF ",
    "Maximal ",
    "Dosierungsschema",
    "Für alle vergütungspflichtigen",
    "Rückerstattungen",
    "Erwachsene",
    "Kriterien für die Vergütung",
];

/// Whether a bold name is a structural marker rather than an indication
#[must_use]
pub fn is_structural_name(name: &str) -> bool {
    let stripped = name.trim().trim_end_matches(':').trim();
    if stripped.is_empty() {
        return true;
    }
    if STRUCTURAL_NAMES.contains(&stripped) {
        return true;
    }
    if STRUCTURAL_PREFIXES.iter().any(|p| stripped.starts_with(p)) {
        return true;
    }
    let digits_only = stripped.replace(['.', ','], "");
    if !digits_only.is_empty() && digits_only.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if stripped.chars().count() <= 3 && stripped.chars().all(char::is_lowercase) {
        return true;
    }
    false
}

/// The first non-structural bold name in a clause, when present
#[must_use]
pub fn leading_name(text: &str) -> Option<String> {
    RE_BOLD
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .find(|name| !is_structural_name(&strip_markup(name)))
}

/// Heading fallback: the first sentence of the markup-free text
///
/// Used when a clause carries no usable bold name at all, so unresolved
/// segments still surface something reviewable.
#[must_use]
pub fn truncated_heading(text: &str) -> Option<String> {
    let plain = strip_markup(text);
    if plain.is_empty() {
        return None;
    }
    let heading = match plain.find('.') {
        Some(end) if end > 0 && end < 120 => plain[..=end].trim().to_string(),
        _ => {
            let cut: String = plain.chars().take(120).collect();
            if plain.chars().count() > 120 {
                format!("{cut}...")
            } else {
                cut
            }
        }
    };
    Some(heading)
}

fn heading_spans(text: &str) -> Vec<(usize, usize, String)> {
    // Paragraph-anchored headings take precedence; inline bold runs are
    // only used when no anchored heading exists.
    let anchored: Vec<(usize, usize, String)> = RE_HEADER_BOLD
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(1)?;
            let name = RE_BOLD.captures(m.as_str())?.get(1)?.as_str().to_string();
            Some((m.start(), m.end(), name))
        })
        .collect();
    if !anchored.is_empty() {
        return anchored;
    }
    RE_BOLD
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_string();
            Some((whole.start(), whole.end(), name))
        })
        .collect()
}

/// Split a clause at its indication headings
///
/// Returns `None` when the text carries no bold heading at all (the
/// caller routes such clauses to the fallback segmenter). Structural
/// headings and their blocks are dropped; if every heading is
/// structural the result is an empty vector and the clause is treated
/// as single-indication by the caller.
#[must_use]
pub fn split_structural(clause: &Clause) -> Option<Vec<Segment>> {
    let text = &clause.text;
    let spans = heading_spans(text);
    if spans.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for (i, (_, end, name)) in spans.iter().enumerate() {
        if is_structural_name(name) {
            continue;
        }
        let seg_end = spans.get(i + 1).map_or(text.len(), |next| next.0);
        let seg_text = text[*end..seg_end].trim().to_string();
        let ordinal = segments.len();
        segments.push(Segment {
            clause: clause.fingerprint.clone(),
            ordinal,
            fingerprint: fingerprint_text(&seg_text),
            heading: Some(name.clone()),
            text: seg_text,
            origin: SegmentOrigin::Structural,
            needs_review: false,
            resolution: None,
        });
    }
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Occurrence, ProductId, SnapshotDate};

    fn clause(text: &str) -> Clause {
        Clause::new(
            fingerprint_text(text),
            text.to_string(),
            Occurrence {
                product: ProductId::from("P"),
                date: SnapshotDate::from_ym(2020, 1).unwrap(),
            },
        )
    }

    #[test]
    fn splits_inline_bold_headings() {
        let c = clause("<b>Indication A</b> text-a <b>Indication B</b> text-b");
        let segments = split_structural(&c).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].ordinal, 0);
        assert_eq!(segments[0].text, "text-a");
        assert_eq!(segments[0].heading.as_deref(), Some("Indication A"));
        assert_eq!(segments[1].ordinal, 1);
        assert_eq!(segments[1].text, "text-b");
    }

    #[test]
    fn anchored_headings_take_precedence_over_inline_bold() {
        let c = clause("<b>Morbus Crohn</b> Text mit <b>UND</b> inline <br><b>Psoriasis</b> mehr");
        let segments = split_structural(&c).unwrap();
        // Inline "UND" is not a boundary: only the two anchored headings count.
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].heading.as_deref(), Some("Morbus Crohn"));
        assert_eq!(segments[1].heading.as_deref(), Some("Psoriasis"));
    }

    #[test]
    fn structural_headings_are_filtered() {
        let c = clause("<b>ODER</b> connective <b>Indication B</b> text-b");
        let segments = split_structural(&c).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].heading.as_deref(), Some("Indication B"));
        assert_eq!(segments[0].ordinal, 0);
    }

    #[test]
    fn no_bold_yields_none() {
        assert!(split_structural(&clause("plain text, no markers")).is_none());
    }

    #[test]
    fn structural_name_rules() {
        assert!(is_structural_name("UND"));
        assert!(is_structural_name("oder:"));
        assert!(is_structural_name("12.5"));
        assert!(is_structural_name("Fr. 120"));
        assert!(is_structural_name("bzw"));
        assert!(!is_structural_name("Morbus Crohn"));
    }

    #[test]
    fn leading_name_skips_structural_bold() {
        assert_eq!(
            leading_name("<b>UND</b> <b>Psoriasis</b> text"),
            Some("Psoriasis".to_string())
        );
    }
}
