//! # Exponent Converter
//!
//! Reads caret notation aloud: `10^-7` becomes "10 to the power of negative
//! 7", `x^2` becomes "x to the power of 2". Base and exponent stay numerals.
//!
//! The base is either a digit run or a single word character. A non-numeric
//! exponent (`e^-x`) is left alone.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::segment::{Segment, SegmentedText, Substitution};

fn exponent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+|\w)\^(-?)([0-9]+)").expect("exponent regex must compile"))
}

/// Whether `text` contains caret notation this pass would rewrite.
pub fn contains_exponent(text: &str) -> bool {
    exponent_re().is_match(text)
}

/// "10 to the power of negative 7".
pub fn spell_power(base: &str, negative: bool, exponent: &str) -> String {
    let sign = if negative { "negative " } else { "" };
    format!("{base} to the power of {sign}{exponent}")
}

fn spell_captures(caps: &Captures<'_>) -> String {
    spell_power(&caps[1], &caps[2] == "-", &caps[3])
}

/// Rewrites caret notation in the raw text.
///
/// Runs after the unit pass. No earlier pass uses `^`, so the order only
/// matters for keeping the most specific notation last.
pub fn apply_exponents(text: &mut SegmentedText) -> Vec<Substitution> {
    let mut applied = Vec::new();
    text.rewrite_raw(|raw, _| {
        let mut pieces = Vec::new();
        let mut last = 0;
        for caps in exponent_re().captures_iter(raw) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let spoken = spell_captures(&caps);
            if whole.start() > last {
                pieces.push(Segment::Raw(raw[last..whole.start()].to_string()));
            }
            applied.push(Substitution {
                original: whole.as_str().to_string(),
                replacement: spoken.clone(),
            });
            pieces.push(Segment::Normalized(spoken));
            last = whole.end();
        }
        if last < raw.len() {
            pieces.push(Segment::Raw(raw[last..].to_string()));
        }
        pieces
    });
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> String {
        let mut text = SegmentedText::new(input);
        apply_exponents(&mut text);
        text.into_string()
    }

    #[test]
    fn test_negative_exponent() {
        assert_eq!(run("10^-7"), "10 to the power of negative 7");
    }

    #[test]
    fn test_positive_exponent_has_no_sign_word() {
        assert_eq!(run("10^7"), "10 to the power of 7");
        assert_eq!(run("about 6^23 molecules"), "about 6 to the power of 23 molecules");
    }

    #[test]
    fn test_single_character_base() {
        assert_eq!(run("x^2 + y^3"), "x to the power of 2 + y to the power of 3");
    }

    #[test]
    fn test_symbolic_exponent_untouched() {
        assert_eq!(run("e^-x"), "e^-x");
        assert!(!contains_exponent("e^x"));
    }

    #[test]
    fn test_multiple_in_one_sentence() {
        let mut text = SegmentedText::new("from 10^-9 to 10^-3 M");
        let applied = apply_exponents(&mut text);
        assert_eq!(applied.len(), 2);
        assert_eq!(
            text.render(),
            "from 10 to the power of negative 9 to 10 to the power of negative 3 M"
        );
    }
}
