//! Errors raised while building or extending rule tables.
//!
//! Normalization itself never fails: every pass is a total function from text
//! to text. The only fallible surface is the shape of the tables.

use crate::tables::Category;

/// A rule table rejected at construction or registration time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// A term with no characters would match everywhere.
    #[error("empty term in category {category}")]
    EmptyTerm { category: Category },

    /// Terms are matched as single words and cannot span whitespace.
    #[error("term {term:?} in category {category} contains whitespace")]
    WhitespaceInTerm { category: Category, term: String },

    /// The same term listed twice in one category.
    #[error("term {term:?} appears more than once in category {category}")]
    DuplicateTerm { category: Category, term: String },

    /// An earlier term of the same category matches inside a later one,
    /// so the later term can never be substituted.
    #[error("term {shadowed:?} in category {category} is unreachable: {shadowing:?} is applied first and matches inside it")]
    ShadowedTerm {
        category: Category,
        shadowing: String,
        shadowed: String,
    },
}
