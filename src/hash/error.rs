use std::io;

use thiserror::Error;

use crate::view_definitions::{ConversionError, UnknownVersion, ViewDefinitionVersion};

/// Errors reading or writing a URL hash
#[derive(Debug, Error)]
pub enum HashError {
    #[error("hash '{0}' has too few segments")]
    TooFewSegments(String),

    #[error(transparent)]
    Version(#[from] UnknownVersion),

    #[error("hash payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("hash payload does not inflate: {0}")]
    Inflate(#[source] io::Error),

    #[error("could not compress hash payload: {0}")]
    Deflate(#[source] io::Error),

    #[error("hash payload inflates past {0} bytes")]
    PayloadTooLarge(u64),

    #[error("hash payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("view definition version {0} cannot be encoded")]
    EncodingUnsupported(ViewDefinitionVersion),
}
