//! # Generic Formula Heuristic
//!
//! Fallback for formulas missing from every table. Listing every formula is
//! not feasible, so any token still raw after the dictionary passes that
//! contains an element-like symbol followed by digits is read symbol by
//! symbol, with digit runs kept as numerals:
//!
//! ```text
//! H3PO4   ->  H 3 P O 4
//! Ca2     ->  Ca 2
//! CaCl2,  ->  Ca Cl 2,
//! ```
//!
//! A run directly followed by `^` ("SO4^2-") keeps its last count raw so the
//! exponent pass reads it as the base of a power.
//!
//! Table hits spell digits as words ("H two O"), heuristic hits keep
//! numerals: the two forms are distinguishable in the output on purpose.
//!
//! The symbol is not checked against the periodic table. Any capital letter,
//! optionally followed by one lowercase letter, counts as a symbol.

use std::sync::OnceLock;

use regex::Regex;

use crate::segment::{Segment, SegmentedText, Substitution};

/// A symbol directly followed by a digit somewhere in the token.
fn formula_hint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z][a-z]?[0-9]").expect("formula hint regex must compile"))
}

/// Maximal run of symbols and digit counts.
fn formula_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:[A-Z][a-z]?[0-9]*)+").expect("formula run regex must compile"))
}

fn symbol_or_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z][a-z]?|[0-9]+").expect("symbol regex must compile"))
}

/// Whether the heuristic would rewrite `token`.
pub fn looks_like_formula(token: &str) -> bool {
    !token.chars().any(char::is_whitespace) && formula_hint_re().is_match(token)
}

/// Spoken form of one token, or `None` when the heuristic does not apply.
///
/// Only runs that contain at least one digit are expanded; text around them
/// (signs, punctuation, lowercase prefixes) is kept as is. Power notation
/// after a run is left untouched for the exponent pass.
pub fn expand_formula_token(token: &str) -> Option<String> {
    split_formula_token(token).map(|(head, tail)| head + tail)
}

/// Expanded head of `token` and the raw rest.
///
/// The rest is empty unless a run is directly followed by `^`: the run's last
/// symbol or count is then the base of a power, and it stays raw together
/// with everything after it.
fn split_formula_token(token: &str) -> Option<(String, &str)> {
    if !looks_like_formula(token) {
        return None;
    }

    let mut head = String::with_capacity(token.len() * 2);
    let mut last = 0;
    for run in formula_run_re().find_iter(token) {
        if !run.as_str().bytes().any(|b| b.is_ascii_digit()) {
            continue;
        }
        let parts: Vec<&str> = symbol_or_count_re()
            .find_iter(run.as_str())
            .map(|m| m.as_str())
            .collect();
        head.push_str(&token[last..run.start()]);

        if token[run.end()..].starts_with('^') {
            if let Some((base, symbols)) = parts.split_last() {
                for symbol in symbols {
                    head.push_str(symbol);
                    head.push(' ');
                }
                return Some((head, &token[run.end() - base.len()..]));
            }
        }

        head.push_str(&parts.join(" "));
        last = run.end();
    }
    head.push_str(&token[last..]);
    Some((head, ""))
}

/// Rewrites formula-like tokens in the raw text.
///
/// Expects the ion, formula and acronym passes (and custom reservation) to
/// have run: whatever they matched is no longer raw, so a table formula can
/// never fall through to the numeral form. A token touching an already
/// normalized span without whitespace in between is part of a rewritten
/// word and is skipped.
pub fn apply_generic_formulas(text: &mut SegmentedText) -> Vec<Substitution> {
    let mut applied = Vec::new();
    text.rewrite_raw(|raw, around| {
        let mut pieces = Vec::new();
        let mut last = 0;

        for (start, end) in token_spans(raw) {
            let glued_left = start == 0 && around.before.is_some_and(|c| !c.is_whitespace());
            let glued_right = end == raw.len() && around.after.is_some_and(|c| !c.is_whitespace());
            if glued_left || glued_right {
                continue;
            }

            let token = &raw[start..end];
            if let Some((spoken, rest)) = split_formula_token(token) {
                if start > last {
                    pieces.push(Segment::Raw(raw[last..start].to_string()));
                }
                applied.push(Substitution {
                    original: token[..token.len() - rest.len()].to_string(),
                    replacement: spoken.clone(),
                });
                pieces.push(Segment::Normalized(spoken));
                // the power base and what follows stay raw
                last = end - rest.len();
            }
        }

        if last < raw.len() {
            pieces.push(Segment::Raw(raw[last..].to_string()));
        }
        pieces
    });
    applied
}

/// Byte spans of whitespace-delimited tokens.
fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> String {
        let mut text = SegmentedText::new(input);
        apply_generic_formulas(&mut text);
        text.into_string()
    }

    #[test]
    fn test_unlisted_formula_keeps_numerals() {
        assert_eq!(expand_formula_token("H3PO4").as_deref(), Some("H 3 P O 4"));
        assert_eq!(expand_formula_token("Ca2").as_deref(), Some("Ca 2"));
        assert_eq!(expand_formula_token("CaCl2").as_deref(), Some("Ca Cl 2"));
        assert_eq!(expand_formula_token("C6H12O6").as_deref(), Some("C 6 H 12 O 6"));
    }

    #[test]
    fn test_surrounding_characters_kept() {
        assert_eq!(expand_formula_token("(KH2PO4),").as_deref(), Some("(K H 2 P O 4),"));
        assert_eq!(expand_formula_token("SO4-").as_deref(), Some("S O 4-"));
    }

    #[test]
    fn test_tokens_without_symbol_digit_pass_through() {
        assert_eq!(expand_formula_token("ATP"), None);
        assert_eq!(expand_formula_token("7.4"), None);
        assert_eq!(expand_formula_token("mM"), None);
        assert_eq!(expand_formula_token("10^-7"), None);
        assert_eq!(expand_formula_token("enzyme"), None);
    }

    #[test]
    fn test_pass_over_sentence() {
        assert_eq!(
            run("Add H3PO4 and MgSO4 to the buffer"),
            "Add H 3 P O 4 and Mg S O 4 to the buffer"
        );
        // whitespace outside rewritten tokens is preserved
        assert_eq!(run("  Ca2\tsite  "), "  Ca 2\tsite  ");
    }

    #[test]
    fn test_normalized_spans_untouched() {
        let mut text = SegmentedText::new("H2O and H3PO4");
        text.substitute_term("H2O", "H two O");
        apply_generic_formulas(&mut text);
        assert_eq!(text.render(), "H two O and H 3 P O 4");
    }

    #[test]
    fn test_token_glued_to_normalized_span_skipped() {
        let mut text = SegmentedText::new("Ca2+/X2");
        text.substitute_term("Ca2+", "calcium ion");
        let applied = apply_generic_formulas(&mut text);
        assert!(applied.is_empty());
        assert_eq!(text.render(), "calcium ion/X2");
    }

    #[test]
    fn test_power_after_run_left_raw() {
        assert_eq!(expand_formula_token("SO4^2-").as_deref(), Some("S O 4^2-"));
        assert_eq!(split_formula_token("CO3^2-"), Some(("C O ".to_string(), "3^2-")));

        let mut text = SegmentedText::new("CO3^2- ions");
        let applied = apply_generic_formulas(&mut text);
        assert_eq!(applied[0].original, "CO");
        assert_eq!(
            text.segments(),
            &[
                Segment::Normalized("C O ".into()),
                Segment::Raw("3^2- ions".into())
            ]
        );
    }

    #[test]
    fn test_reserved_custom_term_not_expanded() {
        let mut text = SegmentedText::new("XYZ123 binds");
        text.reserve_term("XYZ123", "custom term");
        apply_generic_formulas(&mut text);
        assert_eq!(text.render(), "XYZ123 binds");
    }
}
