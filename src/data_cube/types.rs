//! Kind definitions for cube dimensions

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// What sort of values a dimension holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DimensionKind {
    #[default]
    String,
    Boolean,
    Number,
    Time,
}

impl DimensionKind {
    /// Continuous dimensions can be bucketed and drawn along an axis
    pub fn is_continuous(&self) -> bool {
        matches!(self, DimensionKind::Number | DimensionKind::Time)
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionKind::String => write!(f, "string"),
            DimensionKind::Boolean => write!(f, "boolean"),
            DimensionKind::Number => write!(f, "number"),
            DimensionKind::Time => write!(f, "time"),
        }
    }
}

/// Error when parsing a dimension kind string
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown dimension kind '{input}'. Valid options: string, boolean, number, time")]
pub struct ParseDimensionKindError {
    pub input: String,
}

impl FromStr for DimensionKind {
    type Err = ParseDimensionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "text" => Ok(DimensionKind::String),
            "boolean" | "bool" => Ok(DimensionKind::Boolean),
            "number" | "numeric" => Ok(DimensionKind::Number),
            "time" | "timestamp" | "datetime" => Ok(DimensionKind::Time),
            _ => Err(ParseDimensionKindError { input: s.to_string() }),
        }
    }
}

impl<'de> Deserialize<'de> for DimensionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DimensionKind::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for DimensionKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// Bucketing
// ============================================================================

/// Whether a continuous dimension gets a bucket when split without one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BucketingStrategy {
    #[default]
    DefaultBucket,
    DefaultNoBucket,
}
