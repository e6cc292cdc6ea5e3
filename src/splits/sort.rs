//! Split sort orders

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Which value of a series to sort on when a comparison period is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesDerivation {
    #[default]
    Current,
    Previous,
    Delta,
}

/// Sort on the split dimension's own values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSort {
    pub reference: String,
    pub direction: SortDirection,
}

/// Sort on a series, referenced by its key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSort {
    pub reference: String,
    pub direction: SortDirection,
    pub period: SeriesDerivation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sort {
    Dimension(DimensionSort),
    Series(SeriesSort),
}

impl Sort {
    pub fn dimension(reference: impl Into<String>, direction: SortDirection) -> Self {
        Sort::Dimension(DimensionSort {
            reference: reference.into(),
            direction,
        })
    }

    pub fn series(reference: impl Into<String>, direction: SortDirection) -> Self {
        Sort::Series(SeriesSort {
            reference: reference.into(),
            direction,
            period: SeriesDerivation::Current,
        })
    }

    pub fn reference(&self) -> &str {
        match self {
            Sort::Dimension(s) => &s.reference,
            Sort::Series(s) => &s.reference,
        }
    }

    pub fn direction(&self) -> SortDirection {
        match self {
            Sort::Dimension(s) => s.direction,
            Sort::Series(s) => s.direction,
        }
    }
}
