//! Field normalization for matching keys.
//!
//! Every string field that participates in matching goes through
//! [`normalize`] before it is embedded or compared: punctuation and other
//! symbols become spaces, whitespace runs collapse, and the result is
//! trimmed. Letters (Latin and Cyrillic, case preserved) and digits pass
//! through untouched. Registry names are frequently Cyrillic, so the kept
//! character set covers both scripts.
//!
//! Normalization never drops a record; it only rewrites field values.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is not a Latin/Cyrillic letter, digit, or whitespace.
static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-zА-Яа-яЁё0-9\s]").expect("valid charset regex"));

/// One or more consecutive whitespace characters.
static WS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Normalize a single field value.
///
/// Deterministic and idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(input: &str) -> String {
    let stripped = NON_ALNUM.replace_all(input, " ");
    WS_RUN.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(normalize("Alpha North!!"), "Alpha North");
        assert_eq!(normalize("Bet@ South"), "Bet South");
        assert_eq!(normalize("\"Spartak\" (Moscow)"), "Spartak Moscow");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  Alpha \t North \n "), "Alpha North");
        assert_eq!(normalize("a   b"), "a b");
    }

    #[test]
    fn test_preserves_case_and_digits() {
        assert_eq!(normalize("School No. 42"), "School No 42");
        assert_eq!(normalize("ABC def"), "ABC def");
    }

    #[test]
    fn test_preserves_cyrillic() {
        assert_eq!(normalize("ДЮСШ «Олимп», г. Казань"), "ДЮСШ Олимп г Казань");
        assert_eq!(normalize("ёлка Ёлка"), "ёлка Ёлка");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Alpha North!!",
            "  many   spaces  ",
            "ДЮСШ №1 (г. Омск)",
            "",
            "---",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_output_charset() {
        let out = normalize("a!@#$%^&*()_+б 1 -- 2\tВ");
        for ch in out.chars() {
            assert!(
                ch.is_alphanumeric() || ch == ' ',
                "unexpected char {:?} in {:?}",
                ch,
                out
            );
        }
        // No leading/trailing or doubled spaces
        assert_eq!(out, out.trim());
        assert!(!out.contains("  "));
    }

    #[test]
    fn test_symbols_only_becomes_empty() {
        assert_eq!(normalize("!@# $%^"), "");
    }
}
