//! Error types for catalog loading

use thiserror::Error;

/// Errors that can occur while loading a cube catalog
#[derive(Debug, Error)]
pub enum ParseError {
    /// IO error reading file
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// YAML deserialization error
    #[error("Invalid YAML: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
    /// Structurally valid YAML describing an inconsistent cube
    #[error("Invalid data cube '{cube}': {message}")]
    InvalidCube { cube: String, message: String },
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::Io {
            path: String::new(),
            source: err,
        }
    }
}
