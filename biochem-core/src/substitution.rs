//! # Ordered Substitution Engine
//!
//! A dictionary pass walks one category's entries in their stored order and,
//! for each entry, replaces every whole-word, case-sensitive occurrence in the
//! raw text before moving on to the next entry.
//!
//! There is no longest-match-first resolution. Overlaps are settled by order:
//! between categories the pipeline order wins, inside a category the entry
//! order wins. The whole-word rule and the load-time shadowing check keep
//! short keys from cutting longer ones in half.

use crate::segment::{SegmentedText, Substitution};
use crate::tables::{Category, RuleTable, TermTable};

/// Categories handled by [`apply_dictionary_passes`], in order.
pub const DICTIONARY_ORDER: [Category; 3] = [
    Category::Ions,
    Category::ChemicalFormulas,
    Category::Acronyms,
];

/// Applies one table to the raw parts of `text`.
pub fn apply_table(text: &mut SegmentedText, table: &TermTable) -> Vec<Substitution> {
    let mut applied = Vec::new();
    for entry in table.entries() {
        applied.extend(text.substitute_term(&entry.term, &entry.pronunciation));
    }
    applied
}

/// Ions, then chemical formulas, then acronyms.
///
/// Convenience for callers that only want the dictionary stage; the full
/// pipeline runs these as separate passes.
pub fn apply_dictionary_passes(text: &str, rules: &RuleTable) -> String {
    let mut segmented = SegmentedText::new(text);
    for category in &DICTIONARY_ORDER {
        if let Some(table) = rules.table(category) {
            apply_table(&mut segmented, table);
        }
    }
    segmented.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_hit_spells_digits() {
        let rules = RuleTable::builtin();
        assert_eq!(apply_dictionary_passes("H2O", &rules), "H two O");
        assert_eq!(
            apply_dictionary_passes("H2SO4 and HNO3", &rules),
            "H two S O four and H N O three"
        );
    }

    #[test]
    fn test_longer_key_wins_over_contained_keys() {
        let rules = RuleTable::builtin();
        assert_eq!(apply_dictionary_passes("NADPH", &rules), "N A D P H");
        assert_eq!(apply_dictionary_passes("FADH2", &rules), "F A D H two");
    }

    #[test]
    fn test_ions_before_formulas() {
        let rules = RuleTable::builtin();
        assert_eq!(
            apply_dictionary_passes("Fe2+ can be oxidized to Fe3+ in the presence of O2.", &rules),
            "ferrous ion can be oxidized to ferric ion in the presence of O two."
        );
    }

    #[test]
    fn test_replacement_text_not_rescanned() {
        let mut rules = RuleTable::builtin();
        // the ion pronunciation contains the formula key "ATP"
        rules
            .merge(
                Category::Ions,
                vec![crate::tables::TermEntry::new("ATP4-", "ATP four minus")],
            )
            .unwrap();
        assert_eq!(apply_dictionary_passes("ATP4- binds", &rules), "ATP four minus binds");
    }

    #[test]
    fn test_case_sensitive_keys() {
        let rules = RuleTable::builtin();
        assert_eq!(apply_dictionary_passes("ph pH", &rules), "ph P H");
        assert_eq!(apply_dictionary_passes("PKA pKa", &rules), "protein kinase A P K A");
    }

    #[test]
    fn test_amino_acid_codes() {
        let rules = RuleTable::builtin();
        assert_eq!(
            apply_dictionary_passes("The protein contains Cys, Met, and His residues.", &rules),
            "The protein contains Cysteine, Methionine, and Histidine residues."
        );
    }

    #[test]
    fn test_apply_table_reports_each_hit() {
        let rules = RuleTable::builtin();
        let mut text = SegmentedText::new("ATP, GTP, CTP, and UTP; ATP again");
        let applied = apply_table(&mut text, rules.table(&Category::ChemicalFormulas).unwrap());
        assert_eq!(applied.len(), 5);
        assert_eq!(applied[0].original, "ATP");
        assert_eq!(applied[0].replacement, "A T P");
    }
}
