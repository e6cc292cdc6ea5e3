//! Split model: how rows are grouped, bucketed, sorted and limited

mod bucket;
mod granularity;
mod sort;
mod split;
#[allow(clippy::module_inception)]
mod splits;

pub use bucket::Bucket;
pub use granularity::{best_number_bucket, best_time_bucket, default_bucket};
pub use sort::{DimensionSort, SeriesDerivation, SeriesSort, Sort, SortDirection};
pub use split::Split;
pub use splits::Splits;
