use std::sync::Arc;

use chrono_tz::Tz;

use crate::data_cube::DataCube;
use crate::filter::Filter;
use crate::series::SeriesList;
use crate::splits::Splits;
use crate::time_shift::TimeShift;

/// A fully evaluated query.
///
/// `filter` holds no relative clauses and every clause passed validation.
/// When `time_shift` is set, the time clause covers both the current and the
/// shifted period.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescription {
    pub data_cube: Arc<DataCube>,
    pub timezone: Tz,
    pub filter: Filter,
    pub time_shift: TimeShift,
    pub splits: Splits,
    pub series: SeriesList,
}

/// Executes query descriptions; implemented outside the core
pub trait QueryBackend {
    type Output;
    type Error;

    fn execute(&self, query: &QueryDescription) -> Result<Self::Output, Self::Error>;
}
