//! Code-shaped token and code-announcement patterns
//!
//! Codes appear in clause text either as bare `DDDD.II` tokens or
//! behind an announcement phrase ("Indikationscode ...:", "code
//! suivant ...:", "codice ...:"). Announced codes are the strongest
//! evidence because the phrase binds the code to the clause's
//! indication.

use crate::models::IndicationCode;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::LazyLock;

static RE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}\.\d{2})\b").unwrap());

/// Announcement phrases across the registry's publication languages
static ANNOUNCEMENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // German
        r"(?i)indikationscode[^:]{0,80}:\s*(\d{4}\.\d{2})",
        r"(?i)code[^:]{0,40}versicherer[^:]{0,60}:\s*(\d{4}\.\d{2})",
        // French
        r"(?i)code\s+(?:d.indication\s+)?suivant[^:]{0,80}:\s*(\d{4}\.\d{2})",
        r"(?i)code\s+correspondant[^:]{0,80}:\s*(\d{4}\.\d{2})",
        // Italian
        r"(?i)codice[^:]{0,80}:\s*(\d{4}\.\d{2})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// All code-shaped tokens in a markup-free text, in order of appearance
#[must_use]
pub fn extract_codes(plain_text: &str) -> Vec<IndicationCode> {
    RE_CODE
        .captures_iter(plain_text)
        .map(|c| IndicationCode::new(&c[1]))
        .collect()
}

/// Codes bound to the clause by an announcement phrase
#[must_use]
pub fn extract_announced_codes(plain_text: &str) -> SmallVec<[IndicationCode; 2]> {
    let mut codes: SmallVec<[IndicationCode; 2]> = SmallVec::new();
    for pattern in ANNOUNCEMENT_PATTERNS.iter() {
        for caps in pattern.captures_iter(plain_text) {
            let code = IndicationCode::new(&caps[1]);
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes
}

/// Distinct codes in a text, preserving first-seen order
#[must_use]
pub fn distinct_codes(plain_text: &str) -> Vec<IndicationCode> {
    let mut seen = Vec::new();
    for code in extract_codes(plain_text) {
        if !seen.contains(&code) {
            seen.push(code);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_code_tokens_are_found() {
        let codes = extract_codes("Vergütet unter 1234.01 sowie 5678.02.");
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].as_str(), "1234.01");
    }

    #[test]
    fn five_digit_dossiers_are_not_code_shaped() {
        assert!(extract_codes("siehe 12345.01 und 123.4").is_empty());
    }

    #[test]
    fn german_announcement() {
        let codes = extract_announced_codes(
            "Die Behandlung ist unter folgendem Indikationscode abzurechnen: 2101.03",
        );
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].as_str(), "2101.03");
    }

    #[test]
    fn french_announcement() {
        let codes = extract_announced_codes(
            "Le traitement doit etre facture sous le code suivant aupres de l'assureur: 2101.03",
        );
        assert_eq!(codes.as_slice(), &[IndicationCode::new("2101.03")]);
    }

    #[test]
    fn italian_announcement() {
        let codes =
            extract_announced_codes("Il trattamento va fatturato con il seguente codice: 2101.03");
        assert_eq!(codes.len(), 1);
    }

    #[test]
    fn distinct_codes_dedup_in_order() {
        let codes = distinct_codes("1234.01 text 5678.02 text 1234.01");
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[1].as_str(), "5678.02");
    }
}
