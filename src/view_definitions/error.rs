use thiserror::Error;

use super::ViewDefinitionVersion;
use crate::time::TimeError;

/// Errors turning a view definition into an Essence
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("malformed version {version} view definition: {source}")]
    Malformed {
        version: ViewDefinitionVersion,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),

    #[error("invalid clause on '{reference}': {message}")]
    InvalidClause { reference: String, message: String },

    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error(transparent)]
    Time(#[from] TimeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view definition version '{0}'")]
pub struct UnknownVersion(pub String);
