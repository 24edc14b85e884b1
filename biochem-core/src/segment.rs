//! # Pipeline State
//!
//! The text travelling through the passes is kept as an ordered list of
//! segments instead of a flat string. Only `Raw` segments are visible to the
//! passes; once a span has been rewritten it becomes `Normalized` and no later
//! pass can touch it. This is what keeps "K M" (from "Km") from having its "M"
//! read as molar by the unit pass.
//!
//! Concatenating the segments always yields the current text.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::boundary::{Surroundings, WordMatcher};

/// One span of the text under normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Segment {
    /// Text no pass has rewritten yet.
    Raw(String),
    /// Output of a pass; final.
    Normalized(String),
    /// A custom term held back from the heuristic, unit and exponent passes
    /// until the custom pass replaces it.
    Reserved { term: String, pronunciation: String },
}

impl Segment {
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Raw(text) | Segment::Normalized(text) => text,
            Segment::Reserved { term, .. } => term,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Segment::Raw(_))
    }
}

/// A before/after record of one rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub original: String,
    pub replacement: String,
}

/// The text being normalized, split by what has already been rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentedText {
    segments: Vec<Segment>,
}

impl SegmentedText {
    pub fn new(text: &str) -> Self {
        let segments = if text.is_empty() {
            vec![]
        } else {
            vec![Segment::Raw(text.to_string())]
        };
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The current text.
    pub fn render(&self) -> String {
        self.segments.iter().map(Segment::as_str).collect()
    }

    pub fn into_string(self) -> String {
        self.render()
    }

    /// Replaces every raw segment with the pieces `rewrite` returns for it.
    ///
    /// `rewrite` receives the raw text and the characters just outside it in
    /// the current text, so boundary checks see through segment edges. The
    /// character before is taken from the already rewritten output.
    pub fn rewrite_raw<F>(&mut self, mut rewrite: F)
    where
        F: FnMut(&str, Surroundings) -> Vec<Segment>,
    {
        let old = std::mem::take(&mut self.segments);
        let mut out: Vec<Segment> = Vec::with_capacity(old.len());

        for (i, segment) in old.iter().enumerate() {
            match segment {
                Segment::Raw(text) => {
                    let around = Surroundings {
                        before: out.last().and_then(|s| s.as_str().chars().next_back()),
                        after: old
                            .get(i + 1)
                            .and_then(|s| s.as_str().chars().next()),
                    };
                    for piece in rewrite(text, around) {
                        push_piece(&mut out, piece);
                    }
                }
                other => out.push(other.clone()),
            }
        }

        self.segments = out;
    }

    /// Turns every whole-word occurrence of `term` in raw text into a
    /// `Normalized` span holding `pronunciation`.
    pub fn substitute_term(&mut self, term: &str, pronunciation: &str) -> Vec<Substitution> {
        let mut applied = Vec::new();
        let Some(matcher) = WordMatcher::new(term) else {
            return applied;
        };
        self.rewrite_raw(|raw, around| {
            let hits = matcher.find_all(raw, around);
            split_on_hits(raw, &hits, |_| {
                applied.push(Substitution {
                    original: term.to_string(),
                    replacement: pronunciation.to_string(),
                });
                Segment::Normalized(pronunciation.to_string())
            })
        });
        applied
    }

    /// Turns every whole-word occurrence of `term` in raw text into a
    /// `Reserved` span.
    pub fn reserve_term(&mut self, term: &str, pronunciation: &str) -> usize {
        let mut count = 0;
        let Some(matcher) = WordMatcher::new(term) else {
            return count;
        };
        self.rewrite_raw(|raw, around| {
            let hits = matcher.find_all(raw, around);
            count += hits.len();
            split_on_hits(raw, &hits, |hit| Segment::Reserved {
                term: raw[hit].to_string(),
                pronunciation: pronunciation.to_string(),
            })
        });
        count
    }

    /// Resolves every reserved span into its pronunciation.
    pub fn release_reserved(&mut self) -> Vec<Substitution> {
        let mut released = Vec::new();
        for segment in &mut self.segments {
            if let Segment::Reserved { term, pronunciation } = segment {
                released.push(Substitution {
                    original: term.clone(),
                    replacement: pronunciation.clone(),
                });
                *segment = Segment::Normalized(std::mem::take(pronunciation));
            }
        }
        released
    }
}

/// Cuts `raw` at `hits`, keeping the gaps raw and mapping each hit range
/// with `make`.
pub(crate) fn split_on_hits<F>(raw: &str, hits: &[Range<usize>], mut make: F) -> Vec<Segment>
where
    F: FnMut(Range<usize>) -> Segment,
{
    if hits.is_empty() {
        return vec![Segment::Raw(raw.to_string())];
    }
    let mut pieces = Vec::with_capacity(hits.len() * 2 + 1);
    let mut last = 0;
    for hit in hits {
        if hit.start > last {
            pieces.push(Segment::Raw(raw[last..hit.start].to_string()));
        }
        pieces.push(make(hit.clone()));
        last = hit.end;
    }
    if last < raw.len() {
        pieces.push(Segment::Raw(raw[last..].to_string()));
    }
    pieces
}

/// Appends a piece, merging neighbouring raw text and dropping empty pieces.
fn push_piece(out: &mut Vec<Segment>, piece: Segment) {
    if piece.as_str().is_empty() && !matches!(piece, Segment::Reserved { .. }) {
        return;
    }
    if let (Some(Segment::Raw(prev)), Segment::Raw(next)) = (out.last_mut(), &piece) {
        prev.push_str(next);
        return;
    }
    out.push(piece);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_round_trips_untouched_text() {
        let text = SegmentedText::new("plain text, nothing to do");
        assert_eq!(text.render(), "plain text, nothing to do");
        assert_eq!(text.segments().len(), 1);
    }

    #[test]
    fn test_empty_text_has_no_segments() {
        assert!(SegmentedText::new("").segments().is_empty());
    }

    #[test]
    fn test_substituted_span_is_not_revisited() {
        let mut text = SegmentedText::new("Km is low");
        assert_eq!(text.substitute_term("Km", "K M").len(), 1);
        // the "M" produced above is not raw anymore
        assert!(text.substitute_term("M", " molar").is_empty());
        assert_eq!(text.render(), "K M is low");
        assert_eq!(
            text.segments(),
            &[
                Segment::Normalized("K M".into()),
                Segment::Raw(" is low".into())
            ]
        );
    }

    #[test]
    fn test_boundary_sees_neighbouring_segments() {
        let mut text = SegmentedText::new("xDa");
        text.segments = vec![Segment::Normalized("k".into()), Segment::Raw("Da".into())];
        assert!(text.substitute_term("Da", "daltons").is_empty());
    }

    #[test]
    fn test_reserved_span_released_at_the_end() {
        let mut text = SegmentedText::new("use XYZ123 here");
        assert_eq!(text.reserve_term("XYZ123", "custom term"), 1);
        assert_eq!(text.render(), "use XYZ123 here");
        let released = text.release_reserved();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].original, "XYZ123");
        assert_eq!(text.render(), "use custom term here");
    }
}
