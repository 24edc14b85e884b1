//! # Unit Normalizer
//!
//! Measurement units are a dictionary pass like the others, but they run
//! after the generic formula heuristic. Some unit keys are bare capitals
//! ("M" for molar) that would read as element symbols, and raw unit tokens
//! such as "mM" never look like an element followed by digits, so it is safe
//! to process them late.
//!
//! Every `μ` (Greek mu, U+03BC) unit also has an alias spelled with the
//! micro sign `µ` (U+00B5); both are common in pasted text and render the
//! same.

use crate::boundary::WordMatcher;
use crate::segment::{split_on_hits, Segment, SegmentedText, Substitution};
use crate::tables::TermTable;

/// Default unit table, in application order.
///
/// Compound units come before their tails ("mg/mL" before "mL") so the
/// longer key is never cut in half. "M" maps to " molar", leading space
/// included.
pub const DEFAULT_UNITS: &[(&str, &str)] = &[
    // concentration
    ("mM", "millimolar"),
    ("μM", "micromolar"),
    ("µM", "micromolar"),
    ("nM", "nanomolar"),
    ("M", " molar"),
    // mass per volume
    ("mg/mL", "milligrams per milliliter"),
    ("μg/mL", "micrograms per milliliter"),
    ("µg/mL", "micrograms per milliliter"),
    ("ng/mL", "nanograms per milliliter"),
    // mass
    ("kDa", "kilodaltons"),
    ("Da", "daltons"),
    // length
    ("bp", "base pairs"),
    ("kb", "kilobase pairs"),
    // temperature
    ("ºC", "degrees Celsius"),
    ("°C", "degrees Celsius"),
    ("nm", "nanometers"),
    ("μm", "micrometers"),
    ("µm", "micrometers"),
    // volume
    ("mL", "milliliters"),
    ("μL", "microliters"),
    ("µL", "microliters"),
];

/// Runs the unit table over the raw text.
///
/// Expects the generic formula heuristic to have run already: any
/// capital-plus-digit run left raw at this point is not a formula.
///
/// Units whose key starts with a symbol ("°C") can sit directly against the
/// number; their spoken form gets a separating space in that case.
pub fn apply_units(text: &mut SegmentedText, units: &TermTable) -> Vec<Substitution> {
    let mut applied = Vec::new();
    for entry in units.entries() {
        let Some(matcher) = WordMatcher::new(&entry.term) else {
            continue;
        };
        text.rewrite_raw(|raw, around| {
            let hits = matcher.find_all(raw, around);
            split_on_hits(raw, &hits, |hit| {
                let glued = raw[..hit.start]
                    .chars()
                    .next_back()
                    .or(around.before)
                    .is_some_and(|c| c.is_ascii_digit());
                let spoken = if glued && !entry.pronunciation.starts_with(' ') {
                    format!(" {}", entry.pronunciation)
                } else {
                    entry.pronunciation.clone()
                };
                applied.push(Substitution {
                    original: raw[hit].to_string(),
                    replacement: spoken.clone(),
                });
                Segment::Normalized(spoken)
            })
        });
    }
    applied
}
