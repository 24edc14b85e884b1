//! # Whole-Word Matching
//!
//! Every dictionary term is matched as a whole word: a term must never fire
//! inside a longer token ("M" for molar must not match inside "NADPH").
//!
//! ## Word characters
//!
//! A word character is any Unicode alphanumeric character or `_`. This makes
//! `μ` (and the micro sign `µ`) a word character, the same semantic as the
//! Unicode-aware `\w` class of the `regex` crate.
//!
//! ## Edge rule
//!
//! The boundary is checked per edge of the term, not per edge of the match:
//!
//! - if the term starts with a word character, the character before the
//!   match must be absent or a non-word character (`\b` in the pattern);
//! - if the term ends with a word character, the same holds for the
//!   character after the match (`\b` again);
//! - a leading edge that is a non-word character (`°`) constrains nothing,
//!   so "37°C" still reads as a temperature;
//! - a trailing sign edge (`+`, `-`) must not be followed by a word
//!   character: "Cl-containing" is a compound word, not a chloride ion.
//!
//! So `Mg2+` matches in "Mg2+ ions", `°C` matches in both "37 °C" and
//! "37°C", while `Da` never matches inside "kDa".

use std::ops::Range;

use regex::Regex;

/// Characters that glue two pieces of text into one word.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Characters just outside a haystack that is a slice of a larger text.
///
/// Boundary checks at the haystack edges look at these instead of treating
/// the edge as the end of the string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Surroundings {
    pub before: Option<char>,
    pub after: Option<char>,
}

impl Surroundings {
    /// A haystack that is the whole text.
    pub fn isolated() -> Self {
        Self::default()
    }
}

/// Compiled whole-word matcher for one term.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    re: Regex,
    guard_left: bool,
    guard_right: bool,
}

impl WordMatcher {
    /// `None` for an empty term, which never matches.
    pub fn new(term: &str) -> Option<Self> {
        let first = term.chars().next()?;
        let last = term.chars().next_back()?;
        let guard_left = is_word_char(first);
        let guard_right = is_word_char(last);

        let left = if guard_left { r"\b" } else { "" };
        let right = if guard_right { r"\b" } else { "" };
        let re = Regex::new(&format!("{left}{}{right}", regex::escape(term))).ok()?;
        Some(Self {
            re,
            guard_left,
            guard_right,
        })
    }

    /// Byte range of the first whole-word occurrence at or after `from`.
    pub fn find_at(&self, haystack: &str, from: usize, around: Surroundings) -> Option<Range<usize>> {
        let mut pos = from;
        while pos <= haystack.len() {
            let hit = self.re.find_at(haystack, pos)?;
            let (start, end) = (hit.start(), hit.end());

            // `\b` treats the haystack edges as boundaries; the real neighbours
            // may be in another segment
            let left_ok = !(self.guard_left && start == 0 && around.before.is_some_and(is_word_char));
            let next = haystack[end..].chars().next().or(around.after);
            let right_ok = if self.guard_right {
                !(end == haystack.len() && around.after.is_some_and(is_word_char))
            } else {
                !next.is_some_and(is_word_char)
            };
            if left_ok && right_ok {
                return Some(start..end);
            }

            // step one character, a rejected match may hide an overlapping one
            pos = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }

    /// All non-overlapping occurrences, left to right.
    pub fn find_all(&self, haystack: &str, around: Surroundings) -> Vec<Range<usize>> {
        let mut found = Vec::new();
        let mut pos = 0;
        while let Some(range) = self.find_at(haystack, pos, around) {
            pos = range.end;
            found.push(range);
        }
        found
    }
}

/// Byte range of the first whole-word occurrence of `term` at or after `from`.
pub fn find_whole_word(
    haystack: &str,
    term: &str,
    from: usize,
    around: Surroundings,
) -> Option<Range<usize>> {
    WordMatcher::new(term)?.find_at(haystack, from, around)
}

/// All non-overlapping whole-word occurrences of `term`, left to right.
pub fn whole_word_matches(haystack: &str, term: &str, around: Surroundings) -> Vec<Range<usize>> {
    WordMatcher::new(term)
        .map(|m| m.find_all(haystack, around))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches<'a>(haystack: &'a str, term: &str) -> Vec<&'a str> {
        whole_word_matches(haystack, term, Surroundings::isolated())
            .into_iter()
            .map(|r| &haystack[r])
            .collect()
    }

    #[test]
    fn test_substring_inside_longer_token_is_ignored() {
        assert!(matches("NADPH oxidase", "M").is_empty());
        assert!(matches("NADPH oxidase", "ADP").is_empty());
        assert!(matches("a 50 kDa protein", "Da").is_empty());
    }

    #[test]
    fn test_whole_word_hits() {
        assert_eq!(matches("10 M and 5 M.", "M"), vec!["M", "M"]);
        assert_eq!(matches("(ATP)", "ATP"), vec!["ATP"]);
    }

    #[test]
    fn test_non_word_edges_do_not_need_a_boundary() {
        assert_eq!(matches("Mg2+ ions", "Mg2+"), vec!["Mg2+"]);
        assert_eq!(matches("Cl- ions", "Cl-"), vec!["Cl-"]);
        assert_eq!(matches("at 37°C", "°C"), vec!["°C"]);
        assert_eq!(matches("at 37 °C", "°C"), vec!["°C"]);
    }

    #[test]
    fn test_trailing_sign_edge_needs_a_break() {
        assert!(matches("Cl-containing buffer", "Cl-").is_empty());
        assert_eq!(matches("Cl-, Na+.", "Cl-"), vec!["Cl-"]);
        assert_eq!(matches("Ca2+-ATPase", "Ca2+"), vec!["Ca2+"]);
        let glued = Surroundings {
            before: None,
            after: Some('c'),
        };
        assert!(find_whole_word("Cl-", "Cl-", 0, glued).is_none());
    }

    #[test]
    fn test_matcher_reused_across_haystacks() {
        let matcher = WordMatcher::new("mM").unwrap();
        assert_eq!(matcher.find_all("5 mM and 10 mM", Surroundings::isolated()).len(), 2);
        assert!(matcher.find_all("mMol", Surroundings::isolated()).is_empty());
        assert!(WordMatcher::new("").is_none());
    }

    #[test]
    fn test_leading_word_edge_still_guarded() {
        // "H+" must not fire inside "NADH+"
        assert!(matches("NADH+", "H+").is_empty());
        assert_eq!(matches("H+ gradient", "H+"), vec!["H+"]);
    }

    #[test]
    fn test_micro_sign_is_a_word_character() {
        assert!(is_word_char('μ'));
        assert!(is_word_char('µ'));
        assert_eq!(matches("5 μM NaCl", "μM"), vec!["μM"]);
        assert!(matches("5μM", "μM").is_empty());
        // "M" never matches the tail of "μM"
        assert!(matches("5 μM", "M").is_empty());
    }

    #[test]
    fn test_surroundings_extend_the_haystack() {
        let glued = Surroundings {
            before: Some('k'),
            after: None,
        };
        assert!(find_whole_word("Da", "Da", 0, glued).is_none());
        let spaced = Surroundings {
            before: Some(' '),
            after: Some('.'),
        };
        assert_eq!(find_whole_word("Da", "Da", 0, spaced), Some(0..2));
    }

    #[test]
    fn test_rejected_match_does_not_hide_overlapping_one() {
        // first "aa" at 0 is glued to the third 'a'; no whole-word hit exists
        assert!(matches("aaa", "aa").is_empty());
        assert_eq!(matches("xaa aa", "aa"), vec!["aa"]);
    }

    #[test]
    fn test_empty_term_never_matches() {
        assert!(find_whole_word("anything", "", 0, Surroundings::isolated()).is_none());
    }
}
