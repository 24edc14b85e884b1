//! # biochem-core: Speakable Scientific Notation
//!
//! Speech models stumble over symbolic notation: "NAD+", "Mg2+", "10^-7",
//! "mM". This crate rewrites such notation into plain words a TTS engine reads
//! correctly, before the text is handed to synthesis.
//!
//! ## System Architecture
//!
//! A strict linear pipeline; each pass consumes the previous pass's output:
//!
//! 1.  **Ions** ([`tables`]): `Ca2+` -> "calcium ion".
//! 2.  **Chemical formulas** ([`tables`]): `H2O` -> "H two O", `ATP` -> "A T P".
//! 3.  **Acronyms** ([`tables`]): `pH` -> "P H", `Km` -> "K M".
//! 4.  **Generic formula heuristic** ([`formula`]): unlisted `H3PO4` -> "H 3 P O 4".
//! 5.  **Units** ([`units`]): `mM` -> "millimolar", `°C` -> "degrees Celsius".
//! 6.  **Exponents** ([`exponent`]): `10^-7` -> "10 to the power of negative 7".
//! 7.  **Custom terms** ([`registry`]): caller mappings, applied last.
//!
//! Dictionary terms are matched as whole words and case-sensitively
//! ([`boundary`]). Rewritten spans are never revisited by a later pass
//! ([`segment`]).
//!
//! ## Usage Example
//!
//! ```rust
//! use biochem_core::Preprocessor;
//!
//! let mut preprocessor = Preprocessor::new();
//! preprocessor
//!     .add_custom_mappings([("GFP", "green fluorescent protein")], "custom")
//!     .unwrap();
//!
//! let text = preprocessor.normalize("GFP needs Mg2+ at pH 7.4 and 10^-7 M ATP");
//! assert_eq!(
//!     text,
//!     "green fluorescent protein needs magnesium ion at P H 7.4 and 10 to the power of negative 7  molar A T P"
//! );
//! ```
//!
//! ## Main Modules
//!
//! - [`pipeline`]: the [`Preprocessor`] and the ordered pass list.
//! - [`tables`]: categories, term tables and the built-in defaults.
//! - [`registry`]: custom mappings and collision reporting.
//! - [`handoff`]: values exchanged with the speech engine.

pub mod boundary;
pub mod corpus;
pub mod error;
pub mod exponent;
pub mod formula;
pub mod handoff;
pub mod pipeline;
pub mod registry;
pub mod segment;
pub mod substitution;
pub mod tables;
pub mod units;

pub use error::TableError;
pub use handoff::{Preview, SynthesisRequest, VoiceProfile};
pub use pipeline::{normalize_biochem_text, PassKind, PipelineEvent, Preprocessor, PASS_ORDER};
pub use registry::{CustomMappingRequest, MappingHazard};
pub use segment::Substitution;
pub use tables::{Category, RuleTable, TermEntry, TermTable};
