use thiserror::Error;

use crate::filter::ClauseError;

/// Errors raised while preparing a query from an Essence
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("{} invalid filter clause(s): {}", .0.len(), describe(.0))]
    InvalidClauses(Vec<ClauseError>),
}

fn describe(errors: &[ClauseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl QueryError {
    /// Errors keyed by the dimension they were raised for
    pub fn errors_for(&self, reference: &str) -> Vec<&ClauseError> {
        match self {
            QueryError::InvalidClauses(errors) => {
                errors.iter().filter(|e| e.reference() == reference).collect()
            }
        }
    }
}
