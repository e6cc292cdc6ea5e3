//! Cube schema types (nouns)
//!
//! These types represent the parsed cube catalog: which dimensions and
//! measures a cube exposes and the defaults a fresh exploration starts from.

mod catalog;
mod cube;
mod dimension;
mod measure;
mod types;

pub use catalog::Catalog;
pub use cube::DataCube;
pub use dimension::Dimension;
pub use measure::Measure;
pub use types::{BucketingStrategy, DimensionKind, ParseDimensionKindError};
