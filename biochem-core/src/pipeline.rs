//! # Normalization Pipeline
//!
//! The pipeline runs a fixed, linear list of passes over one text. Each pass
//! takes the previous pass's output and only sees spans nobody has rewritten
//! yet (see [`crate::segment`]).
//!
//! ```text
//! ions -> chemical formulas -> acronyms -> (reserve custom)
//!      -> generic formula heuristic -> units -> exponents -> custom
//! ```
//!
//! The order is the contract. Later passes rely on earlier ones having
//! consumed their class of ambiguity, which is why callers can add terms to a
//! category but can never reorder categories. Every pass states the invariant
//! it assumes about its input in [`PassKind`].
//!
//! ## Modes of use
//! - **Sync**: [`Preprocessor::normalize`] for direct calls.
//! - **Streaming**: [`Preprocessor::normalize_streaming`] pushes one
//!   [`PipelineEvent`] per pass through an `mpsc` channel.
//! - **Batch**: [`Preprocessor::normalize_batch`] spreads independent texts
//!   over the rayon pool; the rule table is shared read-only.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TableError;
use crate::exponent::apply_exponents;
use crate::formula::apply_generic_formulas;
use crate::handoff::{Preview, SynthesisRequest, VoiceProfile};
use crate::registry::{CustomMappingRequest, MappingHazard};
use crate::segment::{SegmentedText, Substitution};
use crate::substitution::apply_table;
use crate::tables::{Category, RuleTable};
use crate::units::apply_units;

/// One step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    /// Input: untouched text. Ion keys carry `+`/`-` suffixes nothing else
    /// looks for, so they go first.
    Ions,
    /// Input: no raw ion left. Table formulas are spelled with digit words
    /// ("H two O").
    ChemicalFormulas,
    /// Input: no raw table formula left.
    Acronyms,
    /// Input: no raw dictionary term left. Marks custom terms so the
    /// heuristic, unit and exponent passes skip them.
    ReserveCustom,
    /// Input: every remaining capital-plus-digit run is unlisted. Expands it
    /// with numerals ("H 3 P O 4").
    GenericFormula,
    /// Input: no formula-like token left raw, so bare capitals such as "M"
    /// can safely be read as units.
    Units,
    /// Input: nothing raw uses `^` except power notation.
    Exponents,
    /// Input: reserved custom terms only. Resolves them.
    Custom,
}

/// The single ordered list of passes.
pub const PASS_ORDER: [PassKind; 8] = [
    PassKind::Ions,
    PassKind::ChemicalFormulas,
    PassKind::Acronyms,
    PassKind::ReserveCustom,
    PassKind::GenericFormula,
    PassKind::Units,
    PassKind::Exponents,
    PassKind::Custom,
];

impl PassKind {
    pub fn name(&self) -> &'static str {
        match self {
            PassKind::Ions => "ions",
            PassKind::ChemicalFormulas => "chemical_formulas",
            PassKind::Acronyms => "acronyms",
            PassKind::ReserveCustom => "reserve_custom",
            PassKind::GenericFormula => "generic_formula",
            PassKind::Units => "units",
            PassKind::Exponents => "exponents",
            PassKind::Custom => "custom",
        }
    }
}

/// Progress events emitted while a text is normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// Normalization of a new text began.
    Started { input_chars: usize },
    /// A pass finished, with every rewrite it made.
    PassCompleted {
        pass: PassKind,
        substitutions: Vec<Substitution>,
    },
    /// Final text.
    Done {
        text: String,
        changed: bool,
        processing_ms: u64,
    },
}

/// The preprocessor: a rule table plus the fixed pass order.
///
/// Each instance owns its tables. Two preprocessors with different custom
/// mappings never see each other's terms, and a preprocessor can be shared
/// across threads for reading while registration (`&mut self`) is
/// serialized by the borrow checker.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    rules: RuleTable,
}

impl Preprocessor {
    /// Preprocessor with the built-in tables.
    pub fn new() -> Self {
        Self {
            rules: RuleTable::builtin(),
        }
    }

    pub fn with_rule_table(rules: RuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Adds term mappings to `category`; see [`RuleTable::register`].
    pub fn add_custom_mappings<I, K, V>(&mut self, mappings: I, category: &str) -> Result<Vec<MappingHazard>, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.rules.register(category, mappings)
    }

    /// Applies caller requests in order, collecting every hazard.
    ///
    /// Stops at the first invalid request; requests before it stay applied.
    pub fn apply_requests(&mut self, requests: &[CustomMappingRequest]) -> Result<Vec<MappingHazard>, TableError> {
        let mut hazards = Vec::new();
        for request in requests {
            hazards.extend(self.rules.register_request(request)?);
        }
        Ok(hazards)
    }

    /// Normalizes one text.
    pub fn normalize(&self, text: &str) -> String {
        self.run(text, None)
    }

    /// Normalizes one text, pushing progress events into `tx`.
    ///
    /// A dropped receiver does not stop the run; the events are just lost.
    pub fn normalize_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        self.run(text, Some(&tx));
    }

    /// Normalizes independent texts in parallel, preserving input order.
    pub fn normalize_batch<S>(&self, texts: &[S]) -> Vec<String>
    where
        S: AsRef<str> + Sync,
    {
        texts.par_iter().map(|t| self.normalize(t.as_ref())).collect()
    }

    /// Original and processed text side by side.
    pub fn preview(&self, text: &str) -> Preview {
        Preview::new(text, self.normalize(text))
    }

    /// Builds the value handed to the speech engine.
    ///
    /// With `preprocess` off the text goes through untouched.
    pub fn prepare_request(&self, text: &str, voice: &VoiceProfile, preprocess: bool) -> SynthesisRequest {
        let text = if preprocess {
            self.normalize(text)
        } else {
            text.to_string()
        };
        SynthesisRequest {
            text,
            language: voice.language.clone(),
            voice_description: voice.voice_description.clone(),
            preprocessed: preprocess,
        }
    }

    fn run(&self, text: &str, tx: Option<&mpsc::Sender<PipelineEvent>>) -> String {
        let start = Instant::now();
        emit(tx, || PipelineEvent::Started {
            input_chars: text.chars().count(),
        });

        let mut state = SegmentedText::new(text);
        for pass in PASS_ORDER {
            let substitutions = self.run_pass(pass, &mut state);
            debug!(pass = pass.name(), substitutions = substitutions.len(), "pass completed");
            emit(tx, || PipelineEvent::PassCompleted { pass, substitutions });
        }

        let normalized = state.into_string();
        emit(tx, || PipelineEvent::Done {
            text: normalized.clone(),
            changed: normalized != text,
            processing_ms: start.elapsed().as_millis() as u64,
        });
        normalized
    }

    fn run_pass(&self, pass: PassKind, state: &mut SegmentedText) -> Vec<Substitution> {
        match pass {
            PassKind::Ions => self.apply_category(&Category::Ions, state),
            PassKind::ChemicalFormulas => self.apply_category(&Category::ChemicalFormulas, state),
            PassKind::Acronyms => self.apply_category(&Category::Acronyms, state),
            PassKind::ReserveCustom => {
                for table in self.rules.custom_tables() {
                    for entry in table.entries() {
                        state.reserve_term(&entry.term, &entry.pronunciation);
                    }
                }
                vec![]
            }
            PassKind::GenericFormula => apply_generic_formulas(state),
            PassKind::Units => match self.rules.table(&Category::Units) {
                Some(units) => apply_units(state, units),
                None => vec![],
            },
            PassKind::Exponents => apply_exponents(state),
            PassKind::Custom => state.release_reserved(),
        }
    }

    fn apply_category(&self, category: &Category, state: &mut SegmentedText) -> Vec<Substitution> {
        match self.rules.table(category) {
            Some(table) => apply_table(state, table),
            None => vec![],
        }
    }
}

/// Sends an event if anyone is listening; builds it only in that case.
fn emit<F>(tx: Option<&mpsc::Sender<PipelineEvent>>, event: F)
where
    F: FnOnce() -> PipelineEvent,
{
    if let Some(tx) = tx {
        let _ = tx.send(event());
    }
}

/// One-shot helper: default tables, optional mappings under `"custom"`.
pub fn normalize_biochem_text(
    text: &str,
    custom_mappings: Option<&BTreeMap<String, String>>,
) -> Result<String, TableError> {
    let mut preprocessor = Preprocessor::new();
    if let Some(mappings) = custom_mappings {
        preprocessor.add_custom_mappings(mappings.iter().map(|(k, v)| (k.as_str(), v.as_str())), "custom")?;
    }
    Ok(preprocessor.normalize(text))
}
