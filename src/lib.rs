//! cubeview - View state, visualization rules and shareable links for cube exploration
//!
//! This library provides:
//! - Cube catalog types and YAML parsing
//! - Filter, split and series models
//! - The immutable Essence view state and its transitions
//! - Visualization rules and best-visualization selection
//! - Versioned view definitions and the URL hash codec
//! - Server-side link building
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `data_cube/` - catalog concepts (Catalog, DataCube, Dimension, Measure)
//! - `filter/`, `splits/`, `series/` - the parts of a view (Filter, Splits, SeriesList)
//! - `essence/` - the whole view state (Essence)
//! - `view_definitions/` - serializable mirrors of an Essence, one per link version
//! - `query/` - what a query backend receives (QueryDescription)
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → Catalog
//! - `visualization/` - Splits + Series → Resolve per visualization
//! - `hash/` - Essence ↔ URL hash
//! - `request/` - view definition → URL hash
//!
//! # Example
//!
//! ```ignore
//! use cubeview::{parser, Essence, Split, VisStrategy, to_hash, essence_from_hash};
//!
//! let catalog = parser::parse_file("cubes.yaml")?;
//! let cube = catalog.data_cube("wiki").unwrap();
//! let essence = Essence::from_data_cube(cube.clone());
//! let channel = Split::from_dimension(cube.get_dimension("channel").unwrap());
//! let essence = essence.add_split(channel, VisStrategy::FairGame);
//! let hash = to_hash(&essence)?;
//! assert_eq!(essence_from_hash(&hash, cube)?, essence);
//! ```

pub mod data_cube;
pub mod time;
pub mod filter;
pub mod splits;
pub mod series;
pub mod time_shift;
pub mod visualization;
pub mod essence;
pub mod query;
pub mod view_definitions;
pub mod hash;
pub mod request;
pub mod parser;
pub mod error;

// Re-export commonly used types
pub use data_cube::{Catalog, DataCube, Dimension, DimensionKind, Measure};
pub use time::{Duration, TimeError, Timekeeper};
pub use filter::{Clause, ClauseError, Filter};
pub use splits::{Bucket, Sort, SortDirection, Split, Splits};
pub use series::{Series, SeriesList};
pub use time_shift::TimeShift;
pub use visualization::{get_best_visualization, Resolve, Visualization, VisualizationSettings};
pub use essence::{Essence, EssenceParams, VisStrategy};
pub use query::{QueryBackend, QueryDescription, QueryError};
pub use view_definitions::{ConversionError, ViewDefinitionVersion};
pub use hash::{essence_from_hash, essence_from_hash_or_default, to_hash, HashError};
pub use request::{make_url, MakeUrlError, MakeUrlRequest, MakeUrlResponse};
pub use error::ParseError;
