//! Text normalization for clause canonicalization and name matching
//!
//! Normalization has two strengths. The canonical clause text keeps the
//! structural markup (`<b>`, `<br>`) the segmenter depends on and only
//! removes noise: entity encoding, tag spelling variants, cosmetic tags,
//! whitespace runs. The folded form used for fingerprints and name
//! comparison additionally lowercases and strips diacritics, so
//! accent/case-only edits do not change a clause's identity.

use regex::Regex;
use std::sync::LazyLock;

static RE_BR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static RE_COSMETIC_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:u|i|em|span)>").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\n\u{a0}]+").unwrap());
static RE_MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?b>|<br>").unwrap());

/// Decode the handful of HTML entities the registry extracts carry
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Normalize a raw clause into its canonical text form
///
/// Keeps `<b>` and `<br>` (segmentation markers), unifies `<br/>`
/// spellings, drops cosmetic tags, decodes entities and collapses
/// whitespace. Any input is accepted; empty input yields the empty
/// string.
#[must_use]
pub fn normalize_clause(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let unified = RE_BR.replace_all(&decoded, "<br>");
    let stripped = RE_COSMETIC_TAG.replace_all(&unified, "");
    RE_WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Fold a single character to its unaccented lowercase ASCII form
///
/// Covers the Latin-1 repertoire of the registry's languages. The table
/// is fixed in-crate: fingerprints must stay bit-stable across builds,
/// so folding cannot depend on an external transliteration crate.
fn fold_char(c: char, out: &mut String) {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
        'ç' => out.push('c'),
        'è' | 'é' | 'ê' | 'ë' => out.push('e'),
        'ì' | 'í' | 'î' | 'ï' => out.push('i'),
        'ñ' => out.push('n'),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => out.push('o'),
        'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
        'ý' | 'ÿ' => out.push('y'),
        'æ' => out.push_str("ae"),
        'œ' => out.push_str("oe"),
        'ß' => out.push_str("ss"),
        _ => out.extend(c.to_lowercase()),
    }
}

/// Lowercase and strip diacritics
#[must_use]
pub fn fold_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        fold_char(c, &mut out);
    }
    out
}

/// Remove structural markup, leaving plain text
///
/// Used where markers would disturb matching; `<br>` becomes a space so
/// adjacent blocks stay separated.
#[must_use]
pub fn strip_markup(text: &str) -> String {
    let replaced = RE_MARKUP.replace_all(text, |caps: &regex::Captures<'_>| {
        if caps[0].eq_ignore_ascii_case("<br>") {
            " "
        } else {
            ""
        }
        .to_string()
    });
    RE_WHITESPACE.replace_all(&replaced, " ").trim().to_string()
}

/// Normalize an indication name for dictionary keys and comparison
///
/// Markup-free, folded, trailing colon stripped, whitespace collapsed.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let plain = strip_markup(&decode_entities(name));
    let folded = fold_text(&plain);
    folded.trim().trim_end_matches(':').trim().to_string()
}

/// Token-order-insensitive form of a normalized name
///
/// Tokens are sorted so "chronique insuffisance renale" and
/// "insuffisance renale chronique" compare equal under the fuzzy scorer.
#[must_use]
pub fn token_sorted(normalized: &str) -> String {
    let mut tokens: Vec<&str> = normalized.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
