//! Measure definitions

use serde::Deserialize;

/// An aggregate a cube can compute
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Measure {
    pub name: String,
    pub title: Option<String>,
    /// Display format hint, e.g. "0,0.0 a"
    pub format: Option<String>,
    /// Opaque aggregation formula handed to the query backend
    pub formula: Option<String>,
}

impl Measure {
    /// Human-readable title, defaulting to the name
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}
