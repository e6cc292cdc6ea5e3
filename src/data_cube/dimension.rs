//! Dimension definitions

use serde::Deserialize;

use super::types::{BucketingStrategy, DimensionKind};
use crate::splits::Bucket;

/// A dimension a cube can be filtered and split on
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub name: String,
    pub title: Option<String>,
    /// Value kind. Defaults to string if not specified.
    #[serde(default)]
    pub kind: DimensionKind,
    #[serde(default)]
    pub bucketing_strategy: BucketingStrategy,
    /// Allowed bucket sizes, smallest first (durations for time, numbers for number)
    pub granularities: Option<Vec<Bucket>>,
    /// The data is already bucketed at this size; finer buckets are pointless
    pub bucketed_by: Option<Bucket>,
    /// "self" to sort splits on this dimension by the dimension itself,
    /// or the name of a measure
    pub sort_strategy: Option<String>,
}

impl Dimension {
    /// Human-readable title, defaulting to the name
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Check if splits on this dimension get a bucket automatically
    pub fn can_bucket_by_default(&self) -> bool {
        self.kind.is_continuous() && self.bucketing_strategy == BucketingStrategy::DefaultBucket
    }

    /// Check if splits on this dimension should sort on the dimension itself
    pub fn sorts_by_self(&self) -> bool {
        self.sort_strategy.as_deref() == Some("self")
    }
}
