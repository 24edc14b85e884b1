//! # Custom Mapping Registry
//!
//! Callers extend the default tables with their own terms. A mapping aimed at
//! `ions`, `chemical_formulas`, `acronyms` or `units` is merged into that
//! table (existing keys overwritten in place, new keys appended). Any other
//! category name creates a custom table, appended after the built-ins and
//! applied last.
//!
//! ## Collision hazards
//!
//! Registration validates term shape and the intra-table invariants and
//! rejects anything that breaks them. Collisions *across* passes are not
//! rejected, only reported as [`MappingHazard`]s and logged: they produce
//! valid but possibly surprising output.
//!
//! Custom terms are reserved before the generic heuristic runs, so a custom
//! key such as "XYZ123" is never split into "X Y Z 123" and a custom key
//! containing `^` is never read as a power. The hazards that remain are about
//! precedence between tables:
//!
//! - a key of a table applied earlier matches the new key, or a whole word
//!   inside it, so the new mapping never sees it intact (`Preempted`);
//! - a key that also exists in a table applied later silently overrides it
//!   (`Overrides`);
//! - a unit key that looks like a formula is rewritten by the heuristic before
//!   the unit pass runs (`HeuristicPreempts`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::boundary::{find_whole_word, Surroundings};
use crate::error::TableError;
use crate::formula::looks_like_formula;
use crate::tables::{Category, RuleTable, TermEntry};

/// A registration that is valid but will not behave like a plain lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingHazard {
    /// `term` is matched first by `by`; the new pronunciation is never used.
    Preempted { term: String, by: Category },
    /// `term` takes precedence over the same key in `overridden`.
    Overrides { term: String, overridden: Category },
    /// Unit `term` looks like a formula and is consumed by the heuristic.
    HeuristicPreempts { term: String },
}

impl MappingHazard {
    pub fn term(&self) -> &str {
        match self {
            MappingHazard::Preempted { term, .. }
            | MappingHazard::Overrides { term, .. }
            | MappingHazard::HeuristicPreempts { term } => term,
        }
    }
}

/// A batch of mappings for one category, as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMappingRequest {
    #[serde(default = "default_category")]
    pub category: String,
    pub mappings: BTreeMap<String, String>,
}

fn default_category() -> String {
    "custom".to_string()
}

impl CustomMappingRequest {
    pub fn new<I, K, V>(category: &str, mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            category: category.to_string(),
            mappings: mappings
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl RuleTable {
    /// Merges `mappings` into `category`, creating a custom table if the name
    /// is not a built-in one.
    ///
    /// On error nothing is changed. On success the returned hazards describe
    /// cross-table collisions of the new keys; each is also logged.
    pub fn register<I, K, V>(&mut self, category: &str, mappings: I) -> Result<Vec<MappingHazard>, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let category = Category::from_name(category);
        let entries: Vec<TermEntry> = mappings
            .into_iter()
            .map(|(term, pronunciation)| TermEntry::new(term, pronunciation))
            .collect();

        let terms: Vec<String> = entries.iter().map(|e| e.term.clone()).collect();
        let created = self.merge(category.clone(), entries)?;
        if created {
            info!(category = %category, terms = terms.len(), "custom table created");
        }

        let hazards: Vec<MappingHazard> = terms
            .iter()
            .flat_map(|term| self.hazards_for(&category, term))
            .collect();
        for hazard in &hazards {
            warn!(category = %category, term = hazard.term(), ?hazard, "custom mapping collision");
        }
        Ok(hazards)
    }

    /// Applies a caller request; see [`RuleTable::register`].
    pub fn register_request(&mut self, request: &CustomMappingRequest) -> Result<Vec<MappingHazard>, TableError> {
        self.register(
            &request.category,
            request.mappings.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    /// Cross-table collisions of `term` registered in `category`.
    pub fn hazards_for(&self, category: &Category, term: &str) -> Vec<MappingHazard> {
        let mut hazards = Vec::new();

        for table in self.tables() {
            if &table.category == category {
                continue;
            }
            if self.applies_before(&table.category, category) {
                // an earlier key hitting anywhere inside the term breaks it up
                let hit = table
                    .entries()
                    .iter()
                    .any(|e| find_whole_word(term, &e.term, 0, Surroundings::isolated()).is_some());
                if hit {
                    hazards.push(MappingHazard::Preempted {
                        term: term.to_string(),
                        by: table.category.clone(),
                    });
                }
            } else if table.contains(term) {
                hazards.push(MappingHazard::Overrides {
                    term: term.to_string(),
                    overridden: table.category.clone(),
                });
            }
        }

        if *category == Category::Units && looks_like_formula(term) {
            hazards.push(MappingHazard::HeuristicPreempts {
                term: term.to_string(),
            });
        }
        hazards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_category_merge() {
        let mut rules = RuleTable::builtin();
        let hazards = rules.register("acronyms", [("FRET", "fret")]).unwrap();
        assert!(hazards.is_empty());
        assert_eq!(rules.table(&Category::Acronyms).unwrap().get("FRET"), Some("fret"));
        assert_eq!(rules.tables().len(), 4);
    }

    #[test]
    fn test_existing_key_overwritten() {
        let mut rules = RuleTable::builtin();
        rules.register("ions", [("H+", "hydrogen ion")]).unwrap();
        assert_eq!(rules.table(&Category::Ions).unwrap().get("H+"), Some("hydrogen ion"));
    }

    #[test]
    fn test_unknown_category_creates_custom_table() {
        let mut rules = RuleTable::builtin();
        let hazards = rules.register("lab", [("XYZ123", "custom term")]).unwrap();
        // reservation protects it from the heuristic, nothing to report
        assert!(hazards.is_empty());
        let custom: Vec<_> = rules.custom_tables().collect();
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].category, Category::Custom("lab".into()));
    }

    #[test]
    fn test_custom_key_shadowed_by_builtin_reported() {
        let mut rules = RuleTable::builtin();
        let hazards = rules.register("custom", [("ATP", "adenosine triphosphate")]).unwrap();
        assert_eq!(
            hazards,
            vec![MappingHazard::Preempted {
                term: "ATP".into(),
                by: Category::ChemicalFormulas,
            }]
        );
    }

    #[test]
    fn test_custom_key_containing_builtin_key_reported() {
        let mut rules = RuleTable::builtin();
        let hazards = rules.register("custom", [("Ca2+-ATPase", "calcium pump")]).unwrap();
        assert_eq!(
            hazards,
            vec![MappingHazard::Preempted {
                term: "Ca2+-ATPase".into(),
                by: Category::Ions,
            }]
        );

        let hazards = rules.register("custom", [("ATP-γS", "A T P gamma S")]).unwrap();
        assert_eq!(
            hazards,
            vec![MappingHazard::Preempted {
                term: "ATP-γS".into(),
                by: Category::ChemicalFormulas,
            }]
        );
    }

    #[test]
    fn test_custom_key_overriding_unit_reported() {
        let mut rules = RuleTable::builtin();
        let hazards = rules.register("custom", [("M", "molecule")]).unwrap();
        assert_eq!(
            hazards,
            vec![MappingHazard::Overrides {
                term: "M".into(),
                overridden: Category::Units,
            }]
        );
    }

    #[test]
    fn test_formula_like_unit_reported() {
        let mut rules = RuleTable::builtin();
        let hazards = rules.register("units", [("U2", "units squared")]).unwrap();
        assert_eq!(hazards, vec![MappingHazard::HeuristicPreempts { term: "U2".into() }]);
    }

    #[test]
    fn test_invalid_mapping_leaves_table_untouched() {
        let mut rules = RuleTable::builtin();
        let before = rules.clone();
        let err = rules.register("custom", [("ok", "fine"), ("", "empty")]);
        assert!(matches!(err, Err(TableError::EmptyTerm { .. })));
        assert_eq!(rules, before);
        assert_eq!(rules.custom_tables().count(), 0);
    }

    #[test]
    fn test_request_defaults_to_custom_category() {
        let request: CustomMappingRequest =
            serde_json::from_str(r#"{"mappings": {"GFP": "green fluorescent protein"}}"#).unwrap();
        assert_eq!(request.category, "custom");

        let mut rules = RuleTable::builtin();
        rules.register_request(&request).unwrap();
        let custom = rules.table(&Category::from_name("custom")).unwrap();
        assert_eq!(custom.get("GFP"), Some("green fluorescent protein"));
    }
}
