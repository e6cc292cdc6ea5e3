use std::sync::Arc;

use chrono_tz::Tz;

use super::strategy::VisStrategy;
use crate::data_cube::DataCube;
use crate::filter::{Clause, Filter, FixedTimeClause};
use crate::query::{QueryDescription, QueryError};
use crate::series::{Series, SeriesList};
use crate::splits::{Sort, SortDirection, Split, Splits};
use crate::time::Timekeeper;
use crate::time_shift::TimeShift;
use crate::visualization::{
    get_best_visualization, Resolve, RuleVariables, Visualization, VisualizationSettings,
};

/// Raw inputs of an Essence before they are checked against the cube
#[derive(Debug, Clone, PartialEq)]
pub struct EssenceParams {
    pub data_cube: Arc<DataCube>,
    /// `None` picks the best visualization for the splits
    pub visualization: Option<Visualization>,
    /// `None` or settings for another visualization fall back to defaults
    pub visualization_settings: Option<VisualizationSettings>,
    pub timezone: Option<Tz>,
    pub filter: Filter,
    pub time_shift: TimeShift,
    pub splits: Splits,
    pub series: SeriesList,
    pub pinned_dimensions: Vec<String>,
    pub pinned_sort: Option<String>,
}

impl EssenceParams {
    /// Inputs of a fresh exploration of `data_cube`
    pub fn defaults(data_cube: Arc<DataCube>) -> Self {
        Self {
            visualization: None,
            visualization_settings: None,
            timezone: Some(data_cube.default_timezone()),
            filter: data_cube.default_filter(),
            time_shift: TimeShift::empty(),
            splits: data_cube.default_splits(),
            series: data_cube.default_series(),
            pinned_dimensions: data_cube.default_pinned_dimensions(),
            pinned_sort: data_cube.default_sort_measure().map(str::to_string),
            data_cube,
        }
    }
}

/// Options for [`Essence::get_effective_filter`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveFilterOptions {
    /// Widen the time clause to also cover the comparison period
    pub combine_with_previous: bool,
    /// Leave this dimension unfiltered
    pub unfilter_dimension: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Choice {
    Keep(Visualization),
    Best(Option<Visualization>),
    KeepUnlessNever(Visualization),
}

/// The complete view state of one exploration.
///
/// Every field is checked against the data cube on construction: clauses,
/// splits, series and pins on unknown references are dropped, buckets are
/// filled in, the time shift is clamped and the visualization is resolved.
/// Transitions return a new Essence and never modify `self`.
#[derive(Debug, Clone, PartialEq)]
pub struct Essence {
    data_cube: Arc<DataCube>,
    visualization: Visualization,
    visualization_settings: VisualizationSettings,
    timezone: Tz,
    filter: Filter,
    time_shift: TimeShift,
    splits: Splits,
    series: SeriesList,
    pinned_dimensions: Vec<String>,
    pinned_sort: Option<String>,
    vis_resolve: Resolve,
}

impl Essence {
    pub fn from_data_cube(data_cube: Arc<DataCube>) -> Self {
        Self::new(EssenceParams::defaults(data_cube))
    }

    pub fn new(params: EssenceParams) -> Self {
        let choice = match params.visualization {
            Some(visualization) => Choice::Keep(visualization),
            None => Choice::Best(None),
        };
        Self::build(params, choice)
    }

    fn build(params: EssenceParams, choice: Choice) -> Self {
        let EssenceParams {
            data_cube,
            visualization: _,
            visualization_settings,
            timezone,
            filter,
            time_shift,
            splits,
            series,
            pinned_dimensions,
            pinned_sort,
        } = params;

        let timezone = timezone.unwrap_or_else(|| data_cube.default_timezone());
        let series = series.constrain_to_measures(&data_cube);
        let filter = filter.constrain_to_dimensions(&data_cube);
        let splits = update_sorting(&splits, &series, &data_cube)
            .constrain_to_dimensions_and_series(&data_cube, &series)
            .update_with_filter(&filter, &data_cube);
        let pinned_dimensions = constrain_pinned(pinned_dimensions, &data_cube);
        let pinned_sort = pinned_sort
            .filter(|measure| data_cube.get_measure(measure).is_some())
            .or_else(|| data_cube.default_sort_measure().map(str::to_string));
        let time_shift = time_shift.constrain_to_filter(&filter, timezone);

        let visualization = choose(choice, &data_cube, &splits, &series);
        let (splits, series, vis_resolve) =
            resolve_visualization(visualization, &data_cube, splits, series);
        let visualization_settings = match visualization_settings {
            Some(settings) if settings.matches(visualization) => settings,
            _ => VisualizationSettings::defaults(visualization),
        };

        Essence {
            data_cube,
            visualization,
            visualization_settings,
            timezone,
            filter,
            time_shift,
            splits,
            series,
            pinned_dimensions,
            pinned_sort,
            vis_resolve,
        }
    }

    /// Current state as construction inputs, for copy-with-override
    pub fn to_params(&self) -> EssenceParams {
        EssenceParams {
            data_cube: Arc::clone(&self.data_cube),
            visualization: Some(self.visualization),
            visualization_settings: Some(self.visualization_settings),
            timezone: Some(self.timezone),
            filter: self.filter.clone(),
            time_shift: self.time_shift,
            splits: self.splits.clone(),
            series: self.series.clone(),
            pinned_dimensions: self.pinned_dimensions.clone(),
            pinned_sort: self.pinned_sort.clone(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn data_cube(&self) -> &Arc<DataCube> {
        &self.data_cube
    }

    pub fn visualization(&self) -> Visualization {
        self.visualization
    }

    pub fn visualization_settings(&self) -> &VisualizationSettings {
        &self.visualization_settings
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn time_shift(&self) -> TimeShift {
        self.time_shift
    }

    pub fn splits(&self) -> &Splits {
        &self.splits
    }

    pub fn series(&self) -> &SeriesList {
        &self.series
    }

    pub fn pinned_dimensions(&self) -> &[String] {
        &self.pinned_dimensions
    }

    pub fn pinned_sort(&self) -> Option<&str> {
        self.pinned_sort.as_deref()
    }

    pub fn vis_resolve(&self) -> &Resolve {
        &self.vis_resolve
    }

    /// Check if the selected visualization can render this state
    pub fn is_renderable(&self) -> bool {
        self.vis_resolve.is_renderable()
    }

    pub fn has_comparison(&self) -> bool {
        !self.time_shift.is_empty()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Move the exploration to another cube, dropping what it cannot express
    pub fn change_data_cube(&self, data_cube: Arc<DataCube>) -> Essence {
        if data_cube == self.data_cube {
            return self.clone();
        }
        let params = EssenceParams {
            data_cube,
            ..self.to_params()
        };
        Self::build(params, Choice::Best(Some(self.visualization)))
    }

    /// Replace the filter. Splits on dimensions whose clause changed get
    /// fresh buckets; the visualization is not re-resolved.
    pub fn change_filter(&self, filter: Filter) -> Essence {
        let filter = filter.constrain_to_dimensions(&self.data_cube);
        let changed = self.filter.changed_references(&filter);
        let splits = self
            .splits
            .remove_bucketing_from(&changed)
            .update_with_filter(&filter, &self.data_cube);
        let time_shift = self.time_shift.constrain_to_filter(&filter, self.timezone);
        Essence {
            filter,
            splits,
            time_shift,
            ..self.clone()
        }
    }

    pub fn change_timezone(&self, timezone: Tz) -> Essence {
        Essence {
            timezone,
            time_shift: self.time_shift.constrain_to_filter(&self.filter, timezone),
            ..self.clone()
        }
    }

    /// Set the comparison period; a shift overlapping the filter is dropped
    pub fn change_comparison_shift(&self, time_shift: TimeShift) -> Essence {
        Essence {
            time_shift: time_shift.constrain_to_filter(&self.filter, self.timezone),
            ..self.clone()
        }
    }

    pub fn change_splits(&self, splits: Splits, strategy: VisStrategy) -> Essence {
        // a pending manual choice is the user's to make
        let strategy = if self.vis_resolve.is_manual() {
            VisStrategy::KeepAlways
        } else {
            strategy
        };
        let choice = match strategy {
            VisStrategy::FairGame => Choice::Best(Some(self.visualization)),
            VisStrategy::UnfairGame => Choice::KeepUnlessNever(self.visualization),
            VisStrategy::KeepAlways => Choice::Keep(self.visualization),
        };
        let params = EssenceParams {
            splits,
            ..self.to_params()
        };
        let essence = Self::build(params, choice);
        if essence.visualization != self.visualization {
            tracing::debug!(
                from = self.visualization.name(),
                to = essence.visualization.name(),
                "visualization switched"
            );
        }
        essence
    }

    pub fn add_split(&self, split: Split, strategy: VisStrategy) -> Essence {
        self.change_splits(self.splits.add_split(split), strategy)
    }

    pub fn remove_split(&self, reference: &str, strategy: VisStrategy) -> Essence {
        self.change_splits(self.splits.remove_split(reference), strategy)
    }

    pub fn change_split(&self, original: &Split, split: Split, strategy: VisStrategy) -> Essence {
        self.change_splits(self.splits.replace(original, split), strategy)
    }

    /// Replace the series. Splits sorted on a removed series are re-pointed
    /// and the current visualization is re-resolved.
    pub fn change_series_list(&self, series: SeriesList) -> Essence {
        let params = EssenceParams {
            series,
            ..self.to_params()
        };
        Self::build(params, Choice::Keep(self.visualization))
    }

    pub fn add_series(&self, series: Series) -> Essence {
        self.change_series_list(self.series.add_series(series))
    }

    pub fn remove_series(&self, key: &str) -> Essence {
        self.change_series_list(self.series.remove_series(key))
    }

    /// Force a visualization, bypassing the best-visualization choice
    pub fn change_visualization(
        &self,
        visualization: Visualization,
        settings: Option<VisualizationSettings>,
    ) -> Essence {
        let params = EssenceParams {
            visualization_settings: settings,
            ..self.to_params()
        };
        Self::build(params, Choice::Keep(visualization))
    }

    pub fn change_visualization_settings(&self, settings: VisualizationSettings) -> Essence {
        if !settings.matches(self.visualization) {
            tracing::debug!(
                visualization = self.visualization.name(),
                "ignoring settings for another visualization"
            );
            return self.clone();
        }
        Essence {
            visualization_settings: settings,
            ..self.clone()
        }
    }

    pub fn pin(&self, reference: &str) -> Essence {
        if self.data_cube.get_dimension(reference).is_none()
            || self.pinned_dimensions.iter().any(|p| p == reference)
        {
            return self.clone();
        }
        let mut pinned_dimensions = self.pinned_dimensions.clone();
        pinned_dimensions.push(reference.to_string());
        Essence {
            pinned_dimensions,
            ..self.clone()
        }
    }

    pub fn unpin(&self, reference: &str) -> Essence {
        Essence {
            pinned_dimensions: self
                .pinned_dimensions
                .iter()
                .filter(|p| *p != reference)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Sort pinned dimensions on another measure
    pub fn change_pinned_sort_series(&self, measure: &str) -> Essence {
        if self.data_cube.get_measure(measure).is_none() {
            return self.clone();
        }
        Essence {
            pinned_sort: Some(measure.to_string()),
            ..self.clone()
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Evaluated clause on the cube's time attribute
    pub fn time_filter(&self, timekeeper: &Timekeeper) -> Option<FixedTimeClause> {
        let time = self.data_cube.time_dimension()?;
        let clause = self.filter.clause_for_reference(&time.name)?;
        match self.evaluate(clause, timekeeper) {
            Clause::FixedTime(clause) => Some(clause),
            _ => None,
        }
    }

    /// The time filter moved back by the time shift
    pub fn previous_time_filter(&self, timekeeper: &Timekeeper) -> Option<FixedTimeClause> {
        let shift = self.time_shift.value()?;
        let current = self.time_filter(timekeeper)?;
        Some(FixedTimeClause {
            ranges: current
                .ranges
                .iter()
                .filter_map(|range| range.shift(shift, self.timezone, -1))
                .collect(),
            reference: current.reference,
        })
    }

    /// The filter a query backend should run: evaluated against the
    /// timekeeper, optionally without one dimension and optionally widened
    /// to the comparison period
    pub fn get_effective_filter(
        &self,
        timekeeper: &Timekeeper,
        options: &EffectiveFilterOptions,
    ) -> Filter {
        let filter = match &options.unfilter_dimension {
            Some(reference) => self.filter.remove_clause(reference),
            None => self.filter.clone(),
        };
        let specific = filter.get_specific_filter(
            timekeeper.now(),
            timekeeper.max_time(&self.data_cube.name),
            self.timezone,
        );
        if !options.combine_with_previous {
            return specific;
        }
        let (Some(shift), Some(time)) = (self.time_shift.value(), self.data_cube.time_dimension())
        else {
            return specific;
        };
        match specific.clause_for_reference(&time.name) {
            Some(Clause::FixedTime(current)) => {
                let previous = current
                    .ranges
                    .iter()
                    .filter_map(|range| range.shift(shift, self.timezone, -1));
                let combined = FixedTimeClause {
                    reference: current.reference.clone(),
                    ranges: current.ranges.iter().copied().chain(previous).collect(),
                };
                specific.set_clause(Clause::FixedTime(combined))
            }
            _ => specific,
        }
    }

    /// Everything a query backend needs, with every clause validated
    pub fn query_description(&self, timekeeper: &Timekeeper) -> Result<QueryDescription, QueryError> {
        self.filter.validate().map_err(QueryError::InvalidClauses)?;
        let filter = self.get_effective_filter(
            timekeeper,
            &EffectiveFilterOptions {
                combine_with_previous: self.has_comparison(),
                unfilter_dimension: None,
            },
        );
        Ok(QueryDescription {
            data_cube: Arc::clone(&self.data_cube),
            timezone: self.timezone,
            filter,
            time_shift: self.time_shift,
            splits: self.splits.clone(),
            series: self.series.clone(),
        })
    }

    /// Check if results computed for `other` are stale for `self`.
    /// Visualization, settings and pins do not change the query.
    pub fn differs_for_query(&self, other: &Essence) -> bool {
        self.data_cube != other.data_cube
            || self.timezone != other.timezone
            || self.filter != other.filter
            || self.time_shift != other.time_shift
            || self.splits != other.splits
            || self.series != other.series
    }

    fn evaluate(&self, clause: &Clause, timekeeper: &Timekeeper) -> Clause {
        clause.evaluate(
            timekeeper.now(),
            timekeeper.max_time(&self.data_cube.name),
            self.timezone,
        )
    }
}

fn choose(
    choice: Choice,
    data_cube: &DataCube,
    splits: &Splits,
    series: &SeriesList,
) -> Visualization {
    match choice {
        Choice::Keep(visualization) => visualization,
        Choice::Best(current) => {
            get_best_visualization(data_cube, splits, series, current).visualization
        }
        Choice::KeepUnlessNever(visualization) => {
            let resolve = visualization.evaluate_rules(&RuleVariables {
                data_cube,
                splits,
                series,
                is_selected_visualization: true,
            });
            if resolve.is_never() {
                get_best_visualization(data_cube, splits, series, None).visualization
            } else {
                visualization
            }
        }
    }
}

/// Evaluate the visualization and apply an automatic adjustment once
fn resolve_visualization(
    visualization: Visualization,
    data_cube: &DataCube,
    splits: Splits,
    series: SeriesList,
) -> (Splits, SeriesList, Resolve) {
    let evaluate = |splits: &Splits, series: &SeriesList| {
        visualization.evaluate_rules(&RuleVariables {
            data_cube,
            splits,
            series,
            is_selected_visualization: true,
        })
    };
    match evaluate(&splits, &series) {
        Resolve::Automatic { adjustment, .. } => {
            let splits = adjustment.splits.unwrap_or(splits);
            let series = adjustment.series.unwrap_or(series);
            let resolve = evaluate(&splits, &series);
            (splits, series, resolve)
        }
        resolve => (splits, series, resolve),
    }
}

/// Re-point splits sorted on a series that is gone to the default sort
/// series, or clear the sort when there is none
fn update_sorting(splits: &Splits, series: &SeriesList, data_cube: &DataCube) -> Splits {
    let fallback = data_cube
        .default_sort_measure()
        .filter(|measure| series.has_series_with_key(measure))
        .map(str::to_string)
        .or_else(|| series.first().map(Series::key));
    let stale: Vec<(String, SortDirection)> = splits
        .iter()
        .filter_map(|split| match &split.sort {
            Some(Sort::Series(sort)) if !series.has_series_with_key(&sort.reference) => {
                Some((sort.reference.clone(), sort.direction))
            }
            _ => None,
        })
        .collect();
    stale
        .into_iter()
        .fold(splits.clone(), |splits, (reference, direction)| {
            let to = fallback.as_ref().map(|key| Sort::series(key.clone(), direction));
            splits.change_sort_if_on_series(&reference, to)
        })
}

fn constrain_pinned(pinned: Vec<String>, data_cube: &DataCube) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(pinned.len());
    for reference in pinned {
        if data_cube.get_dimension(&reference).is_none() {
            tracing::debug!(reference = %reference, "dropping pin on unknown dimension");
        } else if !kept.contains(&reference) {
            kept.push(reference);
        }
    }
    kept
}
