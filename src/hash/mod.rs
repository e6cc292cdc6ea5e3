//! URL hash codec (verb)
//!
//! A hash is `<version>/<payload>` where the payload is the view definition
//! as JSON, raw-deflated and written in the URL-safe base64 alphabet without
//! padding. Version 2 links may also carry the visualization up front:
//! `<visualization>/2/<payload>`.
//!
//! Only the latest version is written by [`to_hash`]; every version is read.

mod error;

pub use error::HashError;

use std::io::{Read, Write};
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::data_cube::DataCube;
use crate::essence::Essence;
use crate::view_definitions::{
    essence_from_json, ViewDefinitionConverter3, ViewDefinitionConverter4,
    ViewDefinitionEncoder, ViewDefinitionVersion,
};
use crate::visualization::Visualization;

/// Hash of an Essence in the latest view definition version
pub fn to_hash(essence: &Essence) -> Result<String, HashError> {
    encode::<ViewDefinitionConverter4>(essence)
}

/// Hash of an Essence in a chosen version; version 2 cannot be written
pub fn to_hash_version(
    essence: &Essence,
    version: ViewDefinitionVersion,
) -> Result<String, HashError> {
    match version {
        ViewDefinitionVersion::V2 => Err(HashError::EncodingUnsupported(version)),
        ViewDefinitionVersion::V3 => encode::<ViewDefinitionConverter3>(essence),
        ViewDefinitionVersion::V4 => encode::<ViewDefinitionConverter4>(essence),
    }
}

pub fn encode<C: ViewDefinitionEncoder>(essence: &Essence) -> Result<String, HashError> {
    let json = serde_json::to_vec(&C::to_view_definition(essence))?;
    Ok(format!("{}/{}", C::VERSION, compress(&json)?))
}

/// A hash split into its parts, payload still compressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHash {
    pub version: ViewDefinitionVersion,
    /// Set only by the legacy `<visualization>/2/...` form
    pub visualization: Option<Visualization>,
    pub payload: String,
}

pub fn parse_hash(hash: &str) -> Result<ParsedHash, HashError> {
    let segments: Vec<&str> = hash.split('/').collect();

    if segments.len() >= 3 && segments[1] == ViewDefinitionVersion::V2.as_str() {
        if let Ok(visualization) = segments[0].parse::<Visualization>() {
            return Ok(ParsedHash {
                version: ViewDefinitionVersion::V2,
                visualization: Some(visualization),
                payload: segments[2..].join("/"),
            });
        }
    }

    if segments.len() < 2 {
        return Err(HashError::TooFewSegments(hash.to_string()));
    }
    Ok(ParsedHash {
        version: segments[0].parse()?,
        visualization: None,
        payload: segments[1..].join("/"),
    })
}

/// Decode a hash of any version against a cube
pub fn essence_from_hash(hash: &str, data_cube: Arc<DataCube>) -> Result<Essence, HashError> {
    let parsed = parse_hash(hash)?;
    let bytes = decompress(&parsed.payload)?;
    let mut value: Value = serde_json::from_slice(&bytes)?;

    if let (Some(visualization), Some(object)) = (parsed.visualization, value.as_object_mut()) {
        object
            .entry("visualization")
            .or_insert_with(|| Value::String(visualization.name().to_string()));
    }

    Ok(essence_from_json(parsed.version, value, data_cube)?)
}

/// Decode a hash, starting a fresh exploration of the cube if it is unusable
pub fn essence_from_hash_or_default(hash: &str, data_cube: Arc<DataCube>) -> Essence {
    match essence_from_hash(hash, Arc::clone(&data_cube)) {
        Ok(essence) => essence,
        Err(err) => {
            tracing::warn!(
                data_cube = %data_cube.name,
                error = %err,
                "invalid or unsupported link, using the cube defaults"
            );
            Essence::from_data_cube(data_cube)
        }
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Largest inflated view definition a hash may carry
pub const MAX_PAYLOAD_BYTES: u64 = 1024 * 1024;

pub fn compress(bytes: &[u8]) -> Result<String, HashError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).map_err(HashError::Deflate)?;
    let compressed = encoder.finish().map_err(HashError::Deflate)?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

pub fn decompress(payload: &str) -> Result<Vec<u8>, HashError> {
    // some link shorteners re-pad the payload
    let compressed = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let mut decoder = DeflateDecoder::new(compressed.as_slice()).take(MAX_PAYLOAD_BYTES + 1);
    let mut bytes = Vec::new();
    decoder
        .read_to_end(&mut bytes)
        .map_err(HashError::Inflate)?;
    if bytes.len() as u64 > MAX_PAYLOAD_BYTES {
        return Err(HashError::PayloadTooLarge(MAX_PAYLOAD_BYTES));
    }
    Ok(bytes)
}
