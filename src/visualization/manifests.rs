//! Rule sets for the built-in visualizations

use super::resolve::{Adjustment, Resolution, Resolve};
use super::rules::{Predicate, Rule, RuleSet, RuleVariables, SplitKindPattern};
use crate::data_cube::{Dimension, DimensionKind};
use crate::series::{Series, SeriesList};
use crate::splits::{Sort, SortDirection, Split, Splits};

const SELECTED_SCORE: u32 = 10;
const NORMAL_PRIORITY: u32 = 4;
const LOW_PRIORITY: u32 = 3;

const TABLE_FIRST_LIMIT: u32 = 50;
const NESTED_LIMIT: u32 = 5;
const CHART_LIMIT: u32 = 25;

// ============================================================================
// Shared helpers
// ============================================================================

/// Sort a split gets when the user has not chosen one
fn default_sort(dimension: &Dimension, series: &SeriesList, default_measure: Option<&str>) -> Sort {
    if dimension.sorts_by_self() || dimension.kind.is_continuous() {
        return Sort::dimension(dimension.name.clone(), SortDirection::Ascending);
    }
    let key = default_measure
        .filter(|measure| series.has_series_with_key(measure))
        .map(str::to_string)
        .or_else(|| series.first().map(Series::key));
    match key {
        Some(key) => Sort::series(key, SortDirection::Descending),
        None => Sort::dimension(dimension.name.clone(), SortDirection::Descending),
    }
}

/// Fill in missing sorts and limits. Returns `None` when nothing changed.
fn fill_missing(vars: &RuleVariables<'_>, limit_for: impl Fn(usize) -> u32) -> Option<Splits> {
    let mut changed = false;
    let splits = vars
        .splits
        .iter()
        .enumerate()
        .map(|(index, split)| {
            let Some(dimension) = vars.data_cube.get_dimension(&split.reference) else {
                return split.clone();
            };
            let mut split = split.clone();
            if split.sort.is_none() {
                split.sort = Some(default_sort(
                    dimension,
                    vars.series,
                    vars.data_cube.default_sort_measure(),
                ));
                changed = true;
            }
            if split.limit.is_none() && split.kind != DimensionKind::Time {
                split.limit = Some(limit_for(index));
                changed = true;
            }
            split
        })
        .collect();
    changed.then(|| Splits::from_splits(splits))
}

fn ready_or_automatic(vars: &RuleVariables<'_>, score: u32, adjusted: Option<Splits>) -> Resolve {
    match adjusted {
        Some(splits) => Resolve::automatic(score, Adjustment::splits(splits)),
        None if vars.is_selected_visualization => Resolve::ready(SELECTED_SCORE),
        None => Resolve::ready(score),
    }
}

/// Offer a split on each of the first two dimensions matching `accept`
fn suggest_splits(vars: &RuleVariables<'_>, accept: impl Fn(&Dimension) -> bool) -> Vec<Resolution> {
    vars.data_cube
        .dimensions
        .iter()
        .filter(|d| accept(d))
        .take(2)
        .map(|dimension| {
            Resolution::new(
                format!("Add a split on {}", dimension.title()),
                Adjustment::splits(Splits::from_split(Split::from_dimension(dimension))),
            )
        })
        .collect()
}

fn keep_first(vars: &RuleVariables<'_>, count: usize) -> Resolution {
    let kept = Splits::from_splits(vars.splits.iter().take(count).cloned().collect());
    let description = if count == 1 {
        "Keep only the first split".to_string()
    } else {
        format!("Keep only the first {} splits", count)
    };
    Resolution::new(description, Adjustment::splits(kept))
}

// ============================================================================
// Totals
// ============================================================================

pub(super) fn totals() -> RuleSet {
    fn no_splits(_: &RuleVariables<'_>) -> Resolve {
        Resolve::ready(SELECTED_SCORE)
    }

    fn has_splits(_: &RuleVariables<'_>) -> Resolve {
        Resolve::manual(
            LOW_PRIORITY,
            "The Totals visualization does not support splits",
            vec![Resolution::new(
                "Remove all splits",
                Adjustment::splits(Splits::empty()),
            )],
        )
    }

    RuleSet {
        rules: vec![Rule::new(vec![Predicate::NoSplits], no_splits)],
        otherwise: has_splits,
    }
}

// ============================================================================
// Table
// ============================================================================

pub(super) fn table() -> RuleSet {
    fn no_splits(vars: &RuleVariables<'_>) -> Resolve {
        Resolve::manual(
            NORMAL_PRIORITY,
            "The Table needs at least one split",
            suggest_splits(vars, |d| d.kind != DimensionKind::Time),
        )
    }

    fn otherwise(vars: &RuleVariables<'_>) -> Resolve {
        let adjusted = fill_missing(vars, |index| {
            if index == 0 {
                TABLE_FIRST_LIMIT
            } else {
                NESTED_LIMIT
            }
        });
        let score = if adjusted.is_some() { 6 } else { 8 };
        ready_or_automatic(vars, score, adjusted)
    }

    RuleSet {
        rules: vec![Rule::new(vec![Predicate::NoSplits], no_splits)],
        otherwise,
    }
}

// ============================================================================
// Bar chart
// ============================================================================

pub(super) fn bar_chart() -> RuleSet {
    fn no_splits(vars: &RuleVariables<'_>) -> Resolve {
        Resolve::manual(
            NORMAL_PRIORITY,
            "The Bar Chart needs one or two splits",
            suggest_splits(vars, |d| d.kind != DimensionKind::Time),
        )
    }

    fn one_or_two(vars: &RuleVariables<'_>) -> Resolve {
        let boost = if vars.splits.iter().any(|s| s.kind == DimensionKind::Boolean) {
            2
        } else {
            0
        };
        let adjusted = fill_missing(vars, |index| if index == 0 { CHART_LIMIT } else { NESTED_LIMIT });
        let score = if adjusted.is_some() { 5 + boost } else { 7 + boost };
        ready_or_automatic(vars, score, adjusted)
    }

    fn too_many(vars: &RuleVariables<'_>) -> Resolve {
        Resolve::manual(
            LOW_PRIORITY,
            "The Bar Chart supports at most two splits",
            vec![keep_first(vars, 2), keep_first(vars, 1)],
        )
    }

    RuleSet {
        rules: vec![
            Rule::new(vec![Predicate::NoSplits], no_splits),
            Rule::new(
                vec![
                    Predicate::ExactSplitKinds(vec![SplitKindPattern::Any]),
                    Predicate::ExactSplitKinds(vec![SplitKindPattern::Any, SplitKindPattern::Any]),
                ],
                one_or_two,
            ),
        ],
        otherwise: too_many,
    }
}

// ============================================================================
// Line chart
// ============================================================================

pub(super) fn line_chart() -> RuleSet {
    fn never(_: &RuleVariables<'_>) -> Resolve {
        Resolve::Never
    }

    fn no_splits(vars: &RuleVariables<'_>) -> Resolve {
        Resolve::manual(
            NORMAL_PRIORITY,
            "The Line Chart needs a continuous split",
            suggest_splits(vars, |d| d.kind.is_continuous()),
        )
    }

    fn continuous_first(vars: &RuleVariables<'_>) -> Resolve {
        let mut changed = false;
        let splits: Vec<Split> = vars
            .splits
            .iter()
            .enumerate()
            .map(|(index, split)| {
                if index == 0 {
                    // the x axis must run along the dimension itself
                    let axis = Sort::dimension(split.reference.clone(), SortDirection::Ascending);
                    if split.sort.as_ref() != Some(&axis) {
                        changed = true;
                        return split.change_sort(Some(axis));
                    }
                    return split.clone();
                }
                let mut split = split.clone();
                if split.sort.is_none() {
                    if let Some(dimension) = vars.data_cube.get_dimension(&split.reference) {
                        split.sort = Some(default_sort(
                            dimension,
                            vars.series,
                            vars.data_cube.default_sort_measure(),
                        ));
                        changed = true;
                    }
                }
                if split.limit.is_none() {
                    split.limit = Some(NESTED_LIMIT);
                    changed = true;
                }
                split
            })
            .collect();
        let time_axis = vars.splits.get(0).map(|s| s.kind) == Some(DimensionKind::Time);
        let score = if time_axis { 7 } else { 4 };
        ready_or_automatic(vars, score, changed.then(|| Splits::from_splits(splits)))
    }

    fn otherwise(vars: &RuleVariables<'_>) -> Resolve {
        let resolutions = vars
            .data_cube
            .dimensions
            .iter()
            .filter(|d| d.kind.is_continuous())
            .take(2)
            .map(|dimension| {
                Resolution::new(
                    format!("Split on {} instead", dimension.title()),
                    Adjustment::splits(Splits::from_split(Split::from_dimension(dimension))),
                )
            })
            .collect();
        Resolve::manual(
            LOW_PRIORITY,
            "The Line Chart needs a continuous dimension as its first split",
            resolutions,
        )
    }

    RuleSet {
        rules: vec![
            Rule::new(vec![Predicate::NoContinuousDimensions], never),
            Rule::new(vec![Predicate::NoSplits], no_splits),
            Rule::new(
                vec![
                    Predicate::ExactSplitKinds(vec![SplitKindPattern::Continuous]),
                    Predicate::ExactSplitKinds(vec![
                        SplitKindPattern::Continuous,
                        SplitKindPattern::Any,
                    ]),
                ],
                continuous_first,
            ),
        ],
        otherwise,
    }
}

// ============================================================================
// Heatmap
// ============================================================================

pub(super) fn heat_map() -> RuleSet {
    fn no_splits(vars: &RuleVariables<'_>) -> Resolve {
        Resolve::manual(
            NORMAL_PRIORITY,
            "The Heatmap needs two splits",
            suggest_splits(vars, |d| !d.kind.is_continuous()),
        )
    }

    fn one_split(vars: &RuleVariables<'_>) -> Resolve {
        let resolutions = vars
            .data_cube
            .dimensions
            .iter()
            .filter(|d| !d.kind.is_continuous() && !vars.splits.has_split_on(&d.name))
            .take(2)
            .map(|dimension| {
                Resolution::new(
                    format!("Add a split on {}", dimension.title()),
                    Adjustment::splits(vars.splits.add_split(Split::from_dimension(dimension))),
                )
            })
            .collect();
        Resolve::manual(LOW_PRIORITY, "The Heatmap needs one more split", resolutions)
    }

    fn no_series(vars: &RuleVariables<'_>) -> Resolve {
        let resolutions = vars
            .data_cube
            .default_sort_measure()
            .map(|measure| {
                Resolution::new(
                    format!("Show {}", measure),
                    Adjustment::series(SeriesList::from_measures([measure])),
                )
            })
            .into_iter()
            .collect();
        Resolve::manual(LOW_PRIORITY, "The Heatmap needs a series to color by", resolutions)
    }

    fn two_splits(vars: &RuleVariables<'_>) -> Resolve {
        let adjusted = fill_missing(vars, |_| CHART_LIMIT);
        ready_or_automatic(vars, if adjusted.is_some() { 4 } else { 5 }, adjusted)
    }

    fn too_many(vars: &RuleVariables<'_>) -> Resolve {
        Resolve::manual(
            LOW_PRIORITY,
            "The Heatmap needs exactly two splits",
            vec![keep_first(vars, 2)],
        )
    }

    RuleSet {
        rules: vec![
            Rule::new(vec![Predicate::NoSplits], no_splits),
            Rule::new(vec![Predicate::SplitCount(1)], one_split),
            Rule::new(vec![Predicate::NoSeries], no_series),
            Rule::new(
                vec![Predicate::ExactSplitKinds(vec![
                    SplitKindPattern::Any,
                    SplitKindPattern::Any,
                ])],
                two_splits,
            ),
        ],
        otherwise: too_many,
    }
}
