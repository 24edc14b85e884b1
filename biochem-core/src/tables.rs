//! # Term Tables
//!
//! Static mappings from a canonical term ("NAD+", "Mg2+", "pKa") to the
//! string a speech model should read instead ("N A D plus", "magnesium ion",
//! "P K A"). Terms are grouped in categories and every category is applied as
//! one pass, in a fixed order.
//!
//! ## Categories
//!
//! | Category            | Example              | Pronunciation        |
//! |---------------------|----------------------|----------------------|
//! | `ions`              | `Ca2+`               | calcium ion          |
//! | `chemical_formulas` | `H2O`, `ATP`, `Cys`  | H two O, A T P, ...  |
//! | `acronyms`          | `pH`, `Km`, `HPLC`   | P H, K M, H P L C    |
//! | `units`             | `mM`, `°C`, `kDa`    | millimolar, ...      |
//! | custom              | caller defined       | caller defined       |
//!
//! Matching is case-sensitive: "ph" and "pH" are different keys.
//!
//! ## Table shape
//!
//! Each category is an ordered list of entries rather than a hash map. The
//! stored order is the tie-break inside a category, and it lets the table be
//! checked at load time for duplicates and for terms that could never match
//! because an earlier term of the same category fires inside them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::boundary::{Surroundings, WordMatcher};
use crate::error::TableError;
use crate::units::DEFAULT_UNITS;

/// A group of terms applied together as one pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Charged species with a sign suffix: `Na+`, `Fe3+`, `OH-`.
    Ions,
    /// Formulas, coenzymes, nucleic acids and amino-acid codes.
    ChemicalFormulas,
    /// Biochemical and laboratory acronyms.
    Acronyms,
    /// Measurement units; applied after the generic formula heuristic.
    Units,
    /// Caller-registered category, applied last.
    Custom(String),
}

impl Category {
    /// The four categories every rule table starts with, in table order.
    pub const BUILTIN: [Category; 4] = [
        Category::Ions,
        Category::ChemicalFormulas,
        Category::Acronyms,
        Category::Units,
    ];

    /// Resolves a category name; unknown names become a custom category.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ions" => Category::Ions,
            "chemical_formulas" => Category::ChemicalFormulas,
            "acronyms" => Category::Acronyms,
            "units" => Category::Units,
            other => Category::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Category::Ions => "ions",
            Category::ChemicalFormulas => "chemical_formulas",
            Category::Acronyms => "acronyms",
            Category::Units => "units",
            Category::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Category::Custom(_))
    }

    /// Position of the category's pass in the pipeline.
    ///
    /// Custom terms are reserved right after the acronym pass, so for
    /// precedence purposes they rank between acronyms and units.
    pub(crate) fn pass_rank(&self) -> u8 {
        match self {
            Category::Ions => 0,
            Category::ChemicalFormulas => 1,
            Category::Acronyms => 2,
            Category::Custom(_) => 3,
            Category::Units => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One term and the text that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub term: String,
    pub pronunciation: String,
}

impl TermEntry {
    pub fn new(term: impl Into<String>, pronunciation: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            pronunciation: pronunciation.into(),
        }
    }
}

/// The ordered entries of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermTable {
    pub category: Category,
    entries: Vec<TermEntry>,
}

impl TermTable {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            entries: vec![],
        }
    }

    pub fn with_entries(category: Category, pairs: &[(&str, &str)]) -> Self {
        Self {
            category,
            entries: pairs.iter().map(|(t, p)| TermEntry::new(*t, *p)).collect(),
        }
    }

    pub fn entries(&self) -> &[TermEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pronunciation of an exact term.
    pub fn get(&self, term: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.term == term)
            .map(|e| e.pronunciation.as_str())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.get(term).is_some()
    }

    /// Overwrites an existing term in place, or appends a new one.
    pub fn upsert(&mut self, entry: TermEntry) {
        match self.entries.iter_mut().find(|e| e.term == entry.term) {
            Some(existing) => existing.pronunciation = entry.pronunciation,
            None => self.entries.push(entry),
        }
    }

    /// Checks term shape, duplicates and intra-category shadowing.
    pub fn validate(&self) -> Result<(), TableError> {
        let mut earlier_matchers: Vec<(&str, WordMatcher)> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            check_term(&self.category, &entry.term)?;

            for (earlier, matcher) in &earlier_matchers {
                if *earlier == entry.term {
                    return Err(TableError::DuplicateTerm {
                        category: self.category.clone(),
                        term: entry.term.clone(),
                    });
                }
                // the later term, taken as a whole text, must not contain a
                // whole-word hit of an earlier one
                if matcher.find_at(&entry.term, 0, Surroundings::isolated()).is_some() {
                    return Err(TableError::ShadowedTerm {
                        category: self.category.clone(),
                        shadowing: earlier.to_string(),
                        shadowed: entry.term.clone(),
                    });
                }
            }
            if let Some(matcher) = WordMatcher::new(&entry.term) {
                earlier_matchers.push((entry.term.as_str(), matcher));
            }
        }
        Ok(())
    }
}

/// A term must be non-empty and a single word.
pub(crate) fn check_term(category: &Category, term: &str) -> Result<(), TableError> {
    if term.is_empty() {
        return Err(TableError::EmptyTerm {
            category: category.clone(),
        });
    }
    if term.chars().any(char::is_whitespace) {
        return Err(TableError::WhitespaceInTerm {
            category: category.clone(),
            term: term.to_string(),
        });
    }
    Ok(())
}

/// Every category held by a preprocessor, in application order.
///
/// The four built-in tables always come first and in fixed order; custom
/// tables are appended in registration order. Callers can add terms but can
/// never reorder categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    tables: Vec<TermTable>,
}

impl RuleTable {
    /// Built-in tables with no terms.
    pub fn empty() -> Self {
        Self {
            tables: Category::BUILTIN.iter().cloned().map(TermTable::new).collect(),
        }
    }

    /// Built-in tables filled with the default terms.
    pub fn builtin() -> Self {
        Self {
            tables: vec![
                TermTable::with_entries(Category::Ions, DEFAULT_IONS),
                TermTable::with_entries(Category::ChemicalFormulas, DEFAULT_CHEMICAL_FORMULAS),
                TermTable::with_entries(Category::Acronyms, DEFAULT_ACRONYMS),
                TermTable::with_entries(Category::Units, DEFAULT_UNITS),
            ],
        }
    }

    /// Builds a rule table from arbitrary tables, merging them category by
    /// category onto [`RuleTable::empty`] so the built-in order is kept.
    pub fn from_tables<I>(tables: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = TermTable>,
    {
        let mut rules = Self::empty();
        for table in tables {
            rules.merge(table.category, table.entries)?;
        }
        Ok(rules)
    }

    pub fn tables(&self) -> &[TermTable] {
        &self.tables
    }

    pub fn table(&self, category: &Category) -> Option<&TermTable> {
        self.tables.iter().find(|t| &t.category == category)
    }

    /// Custom tables in registration order.
    pub fn custom_tables(&self) -> impl Iterator<Item = &TermTable> {
        self.tables.iter().filter(|t| t.category.is_custom())
    }

    pub fn term_count(&self) -> usize {
        self.tables.iter().map(TermTable::len).sum()
    }

    /// Whether a term of category `a` gets the first chance at a span that a
    /// term of category `b` would also match.
    pub(crate) fn applies_before(&self, a: &Category, b: &Category) -> bool {
        match a.pass_rank().cmp(&b.pass_rank()) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => {
                let position = |c: &Category| self.tables.iter().position(|t| &t.category == c);
                position(a) < position(b)
            }
        }
    }

    /// Upserts `entries` into `category`, creating it at the end if needed.
    ///
    /// The change is validated before it is committed: on error the rule
    /// table is left exactly as it was.
    pub(crate) fn merge(&mut self, category: Category, entries: Vec<TermEntry>) -> Result<bool, TableError> {
        for entry in &entries {
            check_term(&category, &entry.term)?;
        }

        let existing = self.tables.iter().position(|t| t.category == category);
        let mut table = match existing {
            Some(i) => self.tables[i].clone(),
            None => TermTable::new(category),
        };
        for entry in entries {
            table.upsert(entry);
        }
        table.validate()?;

        match existing {
            Some(i) => self.tables[i] = table,
            None => self.tables.push(table),
        }
        Ok(existing.is_none())
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Common ions. Applied first because their keys carry sign characters
/// that no other pass expects.
pub const DEFAULT_IONS: &[(&str, &str)] = &[
    ("Na+", "sodium ion"),
    ("K+", "potassium ion"),
    ("Ca2+", "calcium ion"),
    ("Mg2+", "magnesium ion"),
    ("Fe2+", "ferrous ion"),
    ("Fe3+", "ferric ion"),
    ("Cl-", "chloride ion"),
    ("OH-", "hydroxide ion"),
    ("H+", "proton"),
    ("Zn2+", "zinc ion"),
    ("Cu2+", "copper ion"),
    ("Mn2+", "manganese ion"),
];

/// Molecules, coenzymes, nucleic acids and three-letter amino-acid codes.
pub const DEFAULT_CHEMICAL_FORMULAS: &[(&str, &str)] = &[
    // simple molecules
    ("H2O", "H two O"),
    ("O2", "O two"),
    ("CO2", "C O two"),
    ("N2", "N two"),
    ("H2", "H two"),
    ("NH3", "N H three"),
    ("CH4", "C H four"),
    // acids
    ("HCl", "H C L"),
    ("H2SO4", "H two S O four"),
    ("HNO3", "H N O three"),
    // coenzymes and nucleotides
    ("ATP", "A T P"),
    ("ADP", "A D P"),
    ("AMP", "A M P"),
    ("NAD+", "N A D plus"),
    ("NADH", "N A D H"),
    ("NADP+", "N A D P plus"),
    ("NADPH", "N A D P H"),
    ("FAD", "F A D"),
    ("FADH2", "F A D H two"),
    ("CoA", "Coenzyme A"),
    ("GTP", "G T P"),
    ("GDP", "G D P"),
    ("CTP", "C T P"),
    ("UTP", "U T P"),
    // nucleic acids
    ("DNA", "D N A"),
    ("RNA", "R N A"),
    ("mRNA", "messenger R N A"),
    ("tRNA", "transfer R N A"),
    ("rRNA", "ribosomal R N A"),
    ("cDNA", "complementary D N A"),
    // amino acids
    ("Ala", "Alanine"),
    ("Arg", "Arginine"),
    ("Asn", "Asparagine"),
    ("Asp", "Aspartate"),
    ("Cys", "Cysteine"),
    ("Gln", "Glutamine"),
    ("Glu", "Glutamate"),
    ("Gly", "Glycine"),
    ("His", "Histidine"),
    ("Ile", "Isoleucine"),
    ("Leu", "Leucine"),
    ("Lys", "Lysine"),
    ("Met", "Methionine"),
    ("Phe", "Phenylalanine"),
    ("Pro", "Proline"),
    ("Ser", "Serine"),
    ("Thr", "Threonine"),
    ("Trp", "Tryptophan"),
    ("Tyr", "Tyrosine"),
    ("Val", "Valine"),
];

/// Kinetic constants, techniques and enzyme abbreviations.
pub const DEFAULT_ACRONYMS: &[(&str, &str)] = &[
    ("pH", "P H"),
    ("pKa", "P K A"),
    ("Km", "K M"),
    ("Vmax", "V max"),
    ("kcat", "K cat"),
    ("PKA", "protein kinase A"),
    ("PKC", "protein kinase C"),
    ("PCR", "P C R"),
    ("ELISA", "E L I S A"),
    ("SDS-PAGE", "S D S PAGE"),
    ("HPLC", "H P L C"),
    ("NMR", "N M R"),
    ("UV", "U V"),
    ("IR", "I R"),
];
