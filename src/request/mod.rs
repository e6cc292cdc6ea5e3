//! Server-side link building
//!
//! Clients that hold a view definition but not an Essence (reports, alerts,
//! other services) post it here and get back the hash the UI would have put
//! in the address bar.

mod error;

pub use error::MakeUrlError;

use serde::{Deserialize, Serialize};

use crate::data_cube::Catalog;
use crate::hash::to_hash;
use crate::view_definitions::{essence_from_json, ViewDefinitionVersion};

/// Request body for building a link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeUrlRequest {
    pub data_cube_name: String,
    pub view_definition_version: ViewDefinitionVersion,
    pub view_definition: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeUrlResponse {
    /// `#<cube>/<hash>`, ready to append to the application URL
    pub hash: String,
}

/// Decode the definition against the named cube and re-encode it as the
/// latest hash version
pub fn make_url(
    catalog: &Catalog,
    request: &MakeUrlRequest,
) -> Result<MakeUrlResponse, MakeUrlError> {
    let data_cube = catalog
        .data_cube(&request.data_cube_name)
        .ok_or_else(|| MakeUrlError::UnknownDataCube(request.data_cube_name.clone()))?;
    let essence = essence_from_json(
        request.view_definition_version,
        request.view_definition.clone(),
        data_cube,
    )?;
    let hash = to_hash(&essence)?;
    tracing::debug!(
        data_cube = %request.data_cube_name,
        version = %request.view_definition_version,
        "built link"
    );
    Ok(MakeUrlResponse {
        hash: format!("#{}/{}", request.data_cube_name, hash),
    })
}
