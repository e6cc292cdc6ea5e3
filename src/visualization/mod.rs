//! Visualizations and the rules engine choosing between them
//!
//! Each visualization owns a [`RuleSet`] that looks at the splits and series
//! of an exploration and answers with a [`Resolve`]: render it, render it
//! after an automatic fix, ask the user, or never.

mod manifests;
mod resolve;
mod rules;
mod settings;

pub use resolve::{Adjustment, Resolution, Resolve};
pub use rules::{Action, Predicate, Rule, RuleSet, RuleVariables, SplitKindPattern};
pub use settings::{LineChartSettings, TableSettings, VisualizationSettings};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::data_cube::DataCube;
use crate::series::SeriesList;
use crate::splits::Splits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visualization {
    Totals,
    Table,
    LineChart,
    BarChart,
    HeatMap,
}

impl Visualization {
    /// Registration order; ties in [`get_best_visualization`] go to the
    /// earlier entry
    pub const ALL: [Visualization; 5] = [
        Visualization::Totals,
        Visualization::Table,
        Visualization::LineChart,
        Visualization::BarChart,
        Visualization::HeatMap,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Visualization::Totals => "totals",
            Visualization::Table => "table",
            Visualization::LineChart => "line-chart",
            Visualization::BarChart => "bar-chart",
            Visualization::HeatMap => "heatmap",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Visualization::Totals => "Totals",
            Visualization::Table => "Table",
            Visualization::LineChart => "Line Chart",
            Visualization::BarChart => "Bar Chart",
            Visualization::HeatMap => "Heatmap",
        }
    }

    pub fn rules(&self) -> RuleSet {
        match self {
            Visualization::Totals => manifests::totals(),
            Visualization::Table => manifests::table(),
            Visualization::LineChart => manifests::line_chart(),
            Visualization::BarChart => manifests::bar_chart(),
            Visualization::HeatMap => manifests::heat_map(),
        }
    }

    pub fn evaluate_rules(&self, variables: &RuleVariables<'_>) -> Resolve {
        self.rules().evaluate(variables)
    }
}

impl fmt::Display for Visualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown visualization '{0}'")]
pub struct UnknownVisualization(pub String);

impl FromStr for Visualization {
    type Err = UnknownVisualization;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Visualization::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| UnknownVisualization(s.to_string()))
    }
}

impl Serialize for Visualization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Visualization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A visualization together with how it resolved
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationAndResolve {
    pub visualization: Visualization,
    pub resolve: Resolve,
}

/// Pick the visualization that renders the given shape best.
///
/// The current visualization is kept while it is Ready or Automatic.
/// Otherwise every visualization is evaluated and the best resolve wins,
/// earlier registrations winning ties.
pub fn get_best_visualization(
    data_cube: &DataCube,
    splits: &Splits,
    series: &SeriesList,
    current: Option<Visualization>,
) -> VisualizationAndResolve {
    let evaluate = |visualization: Visualization| {
        visualization.evaluate_rules(&RuleVariables {
            data_cube,
            splits,
            series,
            is_selected_visualization: Some(visualization) == current,
        })
    };

    if let Some(current) = current {
        let resolve = evaluate(current);
        if resolve.is_renderable() {
            return VisualizationAndResolve {
                visualization: current,
                resolve,
            };
        }
    }

    let best = Visualization::ALL
        .into_iter()
        .map(|visualization| VisualizationAndResolve {
            visualization,
            resolve: evaluate(visualization),
        })
        .min_by(|a, b| Resolve::compare(&a.resolve, &b.resolve));

    // ALL is non-empty
    best.unwrap_or(VisualizationAndResolve {
        visualization: Visualization::Totals,
        resolve: Resolve::Never,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_cube::fixtures::{labels_cube, wiki_cube};
    use crate::data_cube::DimensionKind;
    use crate::splits::{Sort, SortDirection, Split};

    fn split_on(cube: &DataCube, name: &str) -> Split {
        Split::from_dimension(cube.get_dimension(name).unwrap())
    }

    #[test]
    fn test_names_round_trip() {
        for vis in Visualization::ALL {
            assert_eq!(vis.name().parse::<Visualization>(), Ok(vis));
        }
        assert!("pie".parse::<Visualization>().is_err());
    }

    #[test]
    fn test_no_splits_prefers_totals() {
        let cube = wiki_cube();
        let best = get_best_visualization(&cube, &Splits::empty(), &cube.default_series(), None);
        assert_eq!(best.visualization, Visualization::Totals);
        assert!(best.resolve.is_ready());
    }

    #[test]
    fn test_string_split_prefers_table_with_filled_sort_and_limit() {
        let cube = wiki_cube();
        let series = cube.default_series();
        let splits = Splits::from_split(split_on(&cube, "channel"));
        let best = get_best_visualization(&cube, &splits, &series, Some(Visualization::Totals));
        assert_eq!(best.visualization, Visualization::Table);

        let adjusted = best.resolve.adjustment().unwrap().splits.clone().unwrap();
        let split = adjusted.get(0).unwrap();
        assert_eq!(split.sort, Some(Sort::series("count", SortDirection::Descending)));
        assert_eq!(split.limit, Some(50));
    }

    #[test]
    fn test_time_split_prefers_line_chart() {
        let cube = wiki_cube();
        let splits = Splits::from_split(split_on(&cube, "time"));
        let best = get_best_visualization(&cube, &splits, &cube.default_series(), None);
        assert_eq!(best.visualization, Visualization::LineChart);
        let adjusted = best.resolve.adjustment().unwrap().splits.clone().unwrap();
        assert_eq!(
            adjusted.get(0).unwrap().sort,
            Some(Sort::dimension("time", SortDirection::Ascending))
        );
        assert_eq!(adjusted.get(0).unwrap().limit, None);
    }

    #[test]
    fn test_current_kept_while_renderable() {
        let cube = wiki_cube();
        let splits = Splits::from_split(split_on(&cube, "channel"));
        let best = get_best_visualization(
            &cube,
            &splits,
            &cube.default_series(),
            Some(Visualization::BarChart),
        );
        assert_eq!(best.visualization, Visualization::BarChart);
    }

    #[test]
    fn test_line_chart_never_without_continuous_dimensions() {
        let cube = labels_cube();
        let splits = Splits::from_split(split_on(&cube, "channel"));
        let resolve = Visualization::LineChart.evaluate_rules(&RuleVariables {
            data_cube: &cube,
            splits: &splits,
            series: &cube.default_series(),
            is_selected_visualization: true,
        });
        assert!(resolve.is_never());
    }

    #[test]
    fn test_boolean_split_boosts_bar_chart() {
        let cube = labels_cube();
        let splits = Splits::from_split(split_on(&cube, "isNew"));
        let best = get_best_visualization(&cube, &splits, &cube.default_series(), None);
        assert_eq!(best.visualization, Visualization::BarChart);
        assert_eq!(splits.get(0).unwrap().kind, DimensionKind::Boolean);
    }

    #[test]
    fn test_best_is_never_manual_when_something_renders() {
        let cube = wiki_cube();
        let series = cube.default_series();
        let shapes = vec![
            Splits::empty(),
            Splits::from_split(split_on(&cube, "page")),
            Splits::from_splits(vec![split_on(&cube, "channel"), split_on(&cube, "page")]),
            Splits::from_splits(vec![
                split_on(&cube, "channel"),
                split_on(&cube, "page"),
                split_on(&cube, "isRobot"),
            ]),
        ];
        for splits in shapes {
            for current in [None, Some(Visualization::Totals), Some(Visualization::HeatMap)] {
                let best = get_best_visualization(&cube, &splits, &series, current);
                assert!(best.resolve.is_renderable(), "{:?}", best);
                // deterministic
                assert_eq!(best, get_best_visualization(&cube, &splits, &series, current));
            }
        }
    }

    #[test]
    fn test_heatmap_asks_for_series() {
        let cube = wiki_cube();
        let splits = Splits::from_splits(vec![split_on(&cube, "channel"), split_on(&cube, "page")]);
        let resolve = Visualization::HeatMap.evaluate_rules(&RuleVariables {
            data_cube: &cube,
            splits: &splits,
            series: &SeriesList::empty(),
            is_selected_visualization: true,
        });
        assert!(resolve.is_manual());
        let fix = &resolve.resolutions()[0].adjustment;
        assert_eq!(fix.series, Some(SeriesList::from_measures(["count"])));
    }
}
