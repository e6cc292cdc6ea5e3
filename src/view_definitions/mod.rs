//! Versioned, serializable mirrors of an Essence
//!
//! Every version can be decoded; only versions implementing
//! [`ViewDefinitionEncoder`] can be produced. Version 2 is read-only.
//!
//! - `v2` - filters and splits as query expression trees, measures as names
//! - `v3` - typed clause and split definitions, single/multi measure mode
//! - `v4` - typed series, visualization settings and time shift

mod definitions;
mod error;
pub mod v2;
pub mod v3;
pub mod v4;

pub use definitions::{
    ClauseDefinition, SortDefinition, SplitDefinition, TimePeriodDefinition, TimePeriodKind,
};
pub use error::{ConversionError, UnknownVersion};
pub use v2::{ViewDefinition2, ViewDefinitionConverter2};
pub use v3::{ViewDefinition3, ViewDefinitionConverter3};
pub use v4::{ViewDefinition4, ViewDefinitionConverter4};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::data_cube::DataCube;
use crate::essence::Essence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewDefinitionVersion {
    V2,
    V3,
    V4,
}

impl ViewDefinitionVersion {
    /// The version new links are written in
    pub const LATEST: ViewDefinitionVersion = ViewDefinitionVersion::V4;

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewDefinitionVersion::V2 => "2",
            ViewDefinitionVersion::V3 => "3",
            ViewDefinitionVersion::V4 => "4",
        }
    }
}

impl fmt::Display for ViewDefinitionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewDefinitionVersion {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2" => Ok(ViewDefinitionVersion::V2),
            "3" => Ok(ViewDefinitionVersion::V3),
            "4" => Ok(ViewDefinitionVersion::V4),
            _ => Err(UnknownVersion(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ViewDefinitionVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // links carry the version as a string, API clients sometimes as a number
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }
        let raw = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for ViewDefinitionVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Reads one version's definition into an Essence
pub trait ViewDefinitionDecoder {
    const VERSION: ViewDefinitionVersion;

    type Definition: Serialize + DeserializeOwned;

    fn from_view_definition(
        definition: Self::Definition,
        data_cube: Arc<DataCube>,
    ) -> Result<Essence, ConversionError>;

    fn decode_json(
        value: serde_json::Value,
        data_cube: Arc<DataCube>,
    ) -> Result<Essence, ConversionError> {
        let definition = serde_json::from_value(value).map_err(|source| {
            ConversionError::Malformed {
                version: Self::VERSION,
                source,
            }
        })?;
        Self::from_view_definition(definition, data_cube)
    }
}

/// Writes an Essence as one version's definition
pub trait ViewDefinitionEncoder: ViewDefinitionDecoder {
    fn to_view_definition(essence: &Essence) -> Self::Definition;
}

/// Decode a definition of any version
pub fn essence_from_json(
    version: ViewDefinitionVersion,
    value: serde_json::Value,
    data_cube: Arc<DataCube>,
) -> Result<Essence, ConversionError> {
    match version {
        ViewDefinitionVersion::V2 => ViewDefinitionConverter2::decode_json(value, data_cube),
        ViewDefinitionVersion::V3 => ViewDefinitionConverter3::decode_json(value, data_cube),
        ViewDefinitionVersion::V4 => ViewDefinitionConverter4::decode_json(value, data_cube),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!("4".parse(), Ok(ViewDefinitionVersion::V4));
        assert_eq!("2".parse(), Ok(ViewDefinitionVersion::V2));
        assert_eq!(
            "5".parse::<ViewDefinitionVersion>(),
            Err(UnknownVersion("5".to_string()))
        );

        let from_number: ViewDefinitionVersion = serde_json::from_str("3").unwrap();
        let from_string: ViewDefinitionVersion = serde_json::from_str("\"3\"").unwrap();
        assert_eq!(from_number, ViewDefinitionVersion::V3);
        assert_eq!(from_string, ViewDefinitionVersion::V3);
        assert_eq!(serde_json::to_string(&ViewDefinitionVersion::LATEST).unwrap(), "\"4\"");
    }
}
