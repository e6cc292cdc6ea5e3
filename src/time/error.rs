//! Time parsing errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("Invalid duration '{input}': {message}")]
    InvalidDuration { input: String, message: String },
    #[error("Unknown timezone '{0}'")]
    UnknownTimezone(String),
}
