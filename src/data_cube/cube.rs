//! The data cube definition and the defaults a fresh exploration starts from

use chrono_tz::Tz;
use serde::Deserialize;

use super::dimension::Dimension;
use super::measure::Measure;
use super::types::DimensionKind;
use crate::filter::{Clause, Filter, RelativeTimeClause, TimePeriod};
use crate::series::SeriesList;
use crate::splits::{Split, Splits};
use crate::time::{parse_timezone, Duration, DurationUnit};

const DEFAULT_MAX_SPLITS: usize = 3;
const DEFAULT_SELECTED_MEASURE_COUNT: usize = 4;

/// A queryable dataset with declared dimensions and measures
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCube {
    pub name: String,
    pub title: Option<String>,
    /// Human-readable description for UIs
    pub description: Option<String>,
    /// Opaque identifier of the backing datasource
    pub source: Option<String>,
    /// Name of the primary time dimension
    pub time_attribute: Option<String>,
    /// IANA timezone name, validated when the catalog is parsed
    pub default_timezone: Option<String>,
    pub default_duration: Option<Duration>,
    pub default_sort_measure: Option<String>,
    #[serde(default)]
    pub default_selected_measures: Vec<String>,
    #[serde(default)]
    pub default_split_dimensions: Vec<String>,
    #[serde(default)]
    pub default_pinned_dimensions: Vec<String>,
    pub max_splits: Option<usize>,
    pub dimensions: Vec<Dimension>,
    pub measures: Vec<Measure>,
}

impl DataCube {
    /// Human-readable title, defaulting to the name
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Get a dimension by name
    pub fn get_dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Get a measure by name
    pub fn get_measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }

    /// All dimensions of a kind, in declaration order
    pub fn dimensions_by_kind(&self, kind: DimensionKind) -> Vec<&Dimension> {
        self.dimensions.iter().filter(|d| d.kind == kind).collect()
    }

    /// The primary time dimension, if the cube declares one
    pub fn time_dimension(&self) -> Option<&Dimension> {
        let name = self.time_attribute.as_deref()?;
        self.get_dimension(name).filter(|d| d.kind == DimensionKind::Time)
    }

    /// Check if any dimension can be drawn along a continuous axis
    pub fn has_continuous_dimension(&self) -> bool {
        self.dimensions.iter().any(|d| d.kind.is_continuous())
    }

    pub fn max_splits(&self) -> usize {
        self.max_splits.unwrap_or(DEFAULT_MAX_SPLITS)
    }

    pub fn default_timezone(&self) -> Tz {
        self.default_timezone
            .as_deref()
            .and_then(|name| parse_timezone(name).ok())
            .unwrap_or(Tz::UTC)
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
            .unwrap_or_else(|| Duration::of(1, DurationUnit::Day))
    }

    /// The measure splits sort on unless told otherwise
    pub fn default_sort_measure(&self) -> Option<&str> {
        self.default_sort_measure
            .as_deref()
            .filter(|name| self.get_measure(name).is_some())
            .or_else(|| self.measures.first().map(|m| m.name.as_str()))
    }

    /// Measures selected in a fresh exploration
    pub fn default_selected_measures(&self) -> Vec<&str> {
        let declared: Vec<&str> = self
            .default_selected_measures
            .iter()
            .map(String::as_str)
            .filter(|name| self.get_measure(name).is_some())
            .collect();
        if !declared.is_empty() {
            return declared;
        }
        self.measures
            .iter()
            .take(DEFAULT_SELECTED_MEASURE_COUNT)
            .map(|m| m.name.as_str())
            .collect()
    }

    /// Latest `defaultDuration` on the time attribute, or nothing
    pub fn default_filter(&self) -> Filter {
        match self.time_dimension() {
            Some(time) => Filter::from_clauses(vec![Clause::RelativeTime(RelativeTimeClause {
                reference: time.name.clone(),
                period: TimePeriod::Latest,
                duration: self.default_duration(),
            })]),
            None => Filter::empty(),
        }
    }

    pub fn default_splits(&self) -> Splits {
        Splits::from_splits(
            self.default_split_dimensions
                .iter()
                .filter_map(|name| self.get_dimension(name))
                .map(Split::from_dimension)
                .collect(),
        )
    }

    pub fn default_series(&self) -> SeriesList {
        SeriesList::from_measures(self.default_selected_measures())
    }

    pub fn default_pinned_dimensions(&self) -> Vec<String> {
        self.default_pinned_dimensions
            .iter()
            .filter(|name| self.get_dimension(name).is_some())
            .cloned()
            .collect()
    }
}
