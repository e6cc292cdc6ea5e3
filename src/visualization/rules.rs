//! Decision tables mapping the split/series shape to a resolve
//!
//! A rule set is a literal list of `(predicates, action)` rules plus a
//! fallback. The first rule with any matching predicate fires; when none
//! match, the fallback fires.

use super::resolve::Resolve;
use crate::data_cube::{DataCube, DimensionKind};
use crate::series::SeriesList;
use crate::splits::Splits;

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct RuleVariables<'a> {
    pub data_cube: &'a DataCube,
    pub splits: &'a Splits,
    pub series: &'a SeriesList,
    pub is_selected_visualization: bool,
}

/// One position in a split-kind pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKindPattern {
    /// `*`
    Any,
    /// time or number
    Continuous,
    Kind(DimensionKind),
}

impl SplitKindPattern {
    fn matches(&self, kind: DimensionKind) -> bool {
        match self {
            SplitKindPattern::Any => true,
            SplitKindPattern::Continuous => kind.is_continuous(),
            SplitKindPattern::Kind(k) => *k == kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    NoSplits,
    SplitCount(usize),
    /// Split kinds match the pattern position by position, same length
    ExactSplitKinds(Vec<SplitKindPattern>),
    NoSeries,
    SeriesCountAbove(usize),
    /// The cube has neither time nor number dimensions
    NoContinuousDimensions,
}

impl Predicate {
    pub fn matches(&self, vars: &RuleVariables<'_>) -> bool {
        match self {
            Predicate::NoSplits => vars.splits.is_empty(),
            Predicate::SplitCount(n) => vars.splits.len() == *n,
            Predicate::ExactSplitKinds(pattern) => {
                vars.splits.len() == pattern.len()
                    && vars
                        .splits
                        .iter()
                        .zip(pattern)
                        .all(|(split, p)| p.matches(split.kind))
            }
            Predicate::NoSeries => vars.series.is_empty(),
            Predicate::SeriesCountAbove(n) => vars.series.len() > *n,
            Predicate::NoContinuousDimensions => !vars.data_cube.has_continuous_dimension(),
        }
    }
}

pub type Action = fn(&RuleVariables<'_>) -> Resolve;

#[derive(Debug, Clone)]
pub struct Rule {
    /// OR-combined
    pub predicates: Vec<Predicate>,
    pub action: Action,
}

impl Rule {
    pub fn new(predicates: Vec<Predicate>, action: Action) -> Self {
        Self { predicates, action }
    }

    fn matches(&self, vars: &RuleVariables<'_>) -> bool {
        self.predicates.iter().any(|p| p.matches(vars))
    }
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
    pub otherwise: Action,
}

impl RuleSet {
    pub fn evaluate(&self, vars: &RuleVariables<'_>) -> Resolve {
        let action = self
            .rules
            .iter()
            .find(|rule| rule.matches(vars))
            .map(|rule| rule.action)
            .unwrap_or(self.otherwise);
        action(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_cube::fixtures::{labels_cube, wiki_cube};
    use crate::splits::Split;

    fn ready_one(_: &RuleVariables<'_>) -> Resolve {
        Resolve::ready(1)
    }

    fn ready_two(_: &RuleVariables<'_>) -> Resolve {
        Resolve::ready(2)
    }

    fn never(_: &RuleVariables<'_>) -> Resolve {
        Resolve::Never
    }

    fn rule_set() -> RuleSet {
        RuleSet {
            rules: vec![
                Rule::new(vec![Predicate::NoSplits], ready_one),
                Rule::new(
                    vec![
                        Predicate::ExactSplitKinds(vec![SplitKindPattern::Continuous]),
                        Predicate::SplitCount(3),
                    ],
                    ready_two,
                ),
            ],
            otherwise: never,
        }
    }

    #[test]
    fn test_first_match_wins_else_fallback() {
        let cube = wiki_cube();
        let series = SeriesList::from_measures(["count"]);
        let eval = |splits: &Splits| {
            rule_set().evaluate(&RuleVariables {
                data_cube: &cube,
                splits,
                series: &series,
                is_selected_visualization: false,
            })
        };

        assert_eq!(eval(&Splits::empty()), Resolve::ready(1));
        assert_eq!(
            eval(&Splits::from_split(Split::new("time", DimensionKind::Time))),
            Resolve::ready(2)
        );
        // or-ed predicate: three splits of any kind
        let three = Splits::from_splits(vec![
            Split::new("a", DimensionKind::String),
            Split::new("b", DimensionKind::String),
            Split::new("c", DimensionKind::String),
        ]);
        assert_eq!(eval(&three), Resolve::ready(2));
        assert_eq!(
            eval(&Splits::from_split(Split::new("channel", DimensionKind::String))),
            Resolve::Never
        );
    }

    #[test]
    fn test_split_kind_patterns() {
        let cube = wiki_cube();
        let series = SeriesList::empty();
        let splits = Splits::from_splits(vec![
            Split::new("time", DimensionKind::Time),
            Split::new("channel", DimensionKind::String),
        ]);
        let vars = RuleVariables {
            data_cube: &cube,
            splits: &splits,
            series: &series,
            is_selected_visualization: true,
        };
        assert!(Predicate::ExactSplitKinds(vec![
            SplitKindPattern::Kind(DimensionKind::Time),
            SplitKindPattern::Any
        ])
        .matches(&vars));
        assert!(!Predicate::ExactSplitKinds(vec![SplitKindPattern::Any]).matches(&vars));
        assert!(!Predicate::ExactSplitKinds(vec![
            SplitKindPattern::Any,
            SplitKindPattern::Continuous
        ])
        .matches(&vars));
        assert!(Predicate::NoSeries.matches(&vars));
        assert!(!Predicate::SeriesCountAbove(0).matches(&vars));
        assert!(!Predicate::NoContinuousDimensions.matches(&vars));
    }

    #[test]
    fn test_no_continuous_dimensions() {
        let cube = labels_cube();
        let splits = Splits::empty();
        let series = SeriesList::empty();
        let vars = RuleVariables {
            data_cube: &cube,
            splits: &splits,
            series: &series,
            is_selected_visualization: false,
        };
        assert!(Predicate::NoContinuousDimensions.matches(&vars));
    }
}
