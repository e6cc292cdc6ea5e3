//! Clause validation errors

use thiserror::Error;

/// Why a clause cannot be committed to a query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClauseError {
    /// Clause still being edited: no values or ranges selected
    #[error("Filter on '{reference}' has no values")]
    Empty { reference: String },
    /// MATCH clause with a pattern the regex engine rejects
    #[error("Filter on '{reference}' has an invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        reference: String,
        pattern: String,
        message: String,
    },
    /// MATCH clause holding more than one pattern
    #[error("Filter on '{reference}' matches {count} patterns, expected exactly one")]
    MultiplePatterns { reference: String, count: usize },
    /// Relative time clause used where concrete instants are required
    #[error("Filter on '{reference}' must be evaluated against a time source first")]
    Unevaluated { reference: String },
}

impl ClauseError {
    /// The dimension the failing clause filters
    pub fn reference(&self) -> &str {
        match self {
            ClauseError::Empty { reference }
            | ClauseError::InvalidPattern { reference, .. }
            | ClauseError::MultiplePatterns { reference, .. }
            | ClauseError::Unevaluated { reference } => reference,
        }
    }
}
