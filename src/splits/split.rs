//! A single grouping instruction

use super::bucket::Bucket;
use super::sort::Sort;
use crate::data_cube::{Dimension, DimensionKind};

/// Group rows by one dimension, optionally bucketed, sorted and limited.
///
/// `sort` and `limit` left as `None` are "not configured yet"; visualization
/// rules fill them in through automatic adjustments.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub reference: String,
    pub kind: DimensionKind,
    pub bucket: Option<Bucket>,
    pub sort: Option<Sort>,
    pub limit: Option<u32>,
}

impl Split {
    pub fn new(reference: impl Into<String>, kind: DimensionKind) -> Self {
        Self {
            reference: reference.into(),
            kind,
            bucket: None,
            sort: None,
            limit: None,
        }
    }

    /// An unconfigured split on a dimension
    pub fn from_dimension(dimension: &Dimension) -> Self {
        Self::new(dimension.name.clone(), dimension.kind)
    }

    pub fn change_bucket(&self, bucket: Option<Bucket>) -> Split {
        Split {
            bucket,
            ..self.clone()
        }
    }

    pub fn change_sort(&self, sort: Option<Sort>) -> Split {
        Split {
            sort,
            ..self.clone()
        }
    }

    pub fn change_limit(&self, limit: Option<u32>) -> Split {
        Split {
            limit,
            ..self.clone()
        }
    }

    /// Check if the split sorts on a series rather than itself
    pub fn sorts_on_series(&self) -> bool {
        matches!(self.sort, Some(Sort::Series(_)))
    }
}
