use thiserror::Error;

use crate::hash::HashError;
use crate::view_definitions::ConversionError;

/// Errors answering a make-URL request
#[derive(Debug, Error)]
pub enum MakeUrlError {
    #[error("unknown data cube '{0}'")]
    UnknownDataCube(String),

    #[error("invalid view definition: {0}")]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Hash(#[from] HashError),
}
