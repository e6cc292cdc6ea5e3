//! Clause and split definitions shared by versions 3 and 4

use serde::{Deserialize, Serialize};

use super::error::ConversionError;
use crate::data_cube::{DataCube, DimensionKind};
use crate::filter::{
    BooleanClause, BooleanValue, Clause, DateRange, FixedTimeClause, NumberClause, NumberRange,
    RelativeTimeClause, StringAction, StringClause, TimePeriod,
};
use crate::splits::{Bucket, SeriesDerivation, SeriesSort, Sort, SortDirection, Split};
use crate::time::Duration;

// ============================================================================
// Clauses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClauseDefinition {
    Boolean {
        #[serde(rename = "ref")]
        reference: String,
        #[serde(default)]
        not: bool,
        values: Vec<BooleanValue>,
    },
    Number {
        #[serde(rename = "ref")]
        reference: String,
        #[serde(default)]
        not: bool,
        ranges: Vec<NumberRange>,
    },
    String {
        #[serde(rename = "ref")]
        reference: String,
        #[serde(default)]
        not: bool,
        action: StringAction,
        values: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Time {
        #[serde(rename = "ref")]
        reference: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_ranges: Option<Vec<DateRange>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_periods: Option<Vec<TimePeriodDefinition>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriodKind {
    /// Anchored on the cube's max time
    Latest,
    /// Anchored on "now" floored to the duration
    Floored,
}

/// A relative window: `step` durations away from the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriodDefinition {
    #[serde(rename = "type")]
    pub kind: TimePeriodKind,
    pub duration: Duration,
    pub step: i32,
}

impl ClauseDefinition {
    pub fn reference(&self) -> &str {
        match self {
            ClauseDefinition::Boolean { reference, .. }
            | ClauseDefinition::Number { reference, .. }
            | ClauseDefinition::String { reference, .. }
            | ClauseDefinition::Time { reference, .. } => reference,
        }
    }
}

pub(crate) fn clause_from_definition(
    definition: ClauseDefinition,
    data_cube: &DataCube,
) -> Result<Clause, ConversionError> {
    if data_cube.get_dimension(definition.reference()).is_none() {
        return Err(ConversionError::UnknownDimension(
            definition.reference().to_string(),
        ));
    }
    let clause = match definition {
        ClauseDefinition::Boolean {
            reference,
            not,
            values,
        } => Clause::Boolean(BooleanClause {
            reference,
            values: values.into_iter().collect(),
            not,
        }),
        ClauseDefinition::Number {
            reference,
            not,
            ranges,
        } => Clause::Number(NumberClause {
            reference,
            ranges,
            not,
        }),
        ClauseDefinition::String {
            reference,
            not,
            action,
            values,
        } => Clause::String(StringClause {
            reference,
            action,
            values: values.into_iter().collect(),
            not,
        }),
        ClauseDefinition::Time {
            reference,
            time_ranges,
            time_periods,
        } => {
            if let Some(ranges) = time_ranges.filter(|r| !r.is_empty()) {
                Clause::FixedTime(FixedTimeClause { reference, ranges })
            } else if let Some(period) = time_periods.as_ref().and_then(|p| p.first()) {
                let relative = relative_from_period(period).ok_or_else(|| {
                    ConversionError::InvalidClause {
                        reference: reference.clone(),
                        message: format!(
                            "unsupported time period {:?} with step {}",
                            period.kind, period.step
                        ),
                    }
                })?;
                Clause::RelativeTime(RelativeTimeClause {
                    reference,
                    period: relative,
                    duration: period.duration,
                })
            } else {
                return Err(ConversionError::InvalidClause {
                    reference,
                    message: "time clause without ranges or periods".to_string(),
                });
            }
        }
    };
    Ok(clause)
}

fn relative_from_period(period: &TimePeriodDefinition) -> Option<TimePeriod> {
    match (period.kind, period.step) {
        (TimePeriodKind::Latest, -1) => Some(TimePeriod::Latest),
        (TimePeriodKind::Floored, 0) => Some(TimePeriod::Current),
        (TimePeriodKind::Floored, -1) => Some(TimePeriod::Previous),
        _ => None,
    }
}

pub(crate) fn clause_to_definition(clause: &Clause) -> ClauseDefinition {
    match clause {
        Clause::Boolean(c) => ClauseDefinition::Boolean {
            reference: c.reference.clone(),
            not: c.not,
            values: c.values.iter().cloned().collect(),
        },
        Clause::Number(c) => ClauseDefinition::Number {
            reference: c.reference.clone(),
            not: c.not,
            ranges: c.ranges.clone(),
        },
        Clause::String(c) => ClauseDefinition::String {
            reference: c.reference.clone(),
            not: c.not,
            action: c.action,
            values: c.values.iter().cloned().collect(),
        },
        Clause::FixedTime(c) => ClauseDefinition::Time {
            reference: c.reference.clone(),
            time_ranges: Some(c.ranges.clone()),
            time_periods: None,
        },
        Clause::RelativeTime(c) => {
            let (kind, step) = match c.period {
                TimePeriod::Latest => (TimePeriodKind::Latest, -1),
                TimePeriod::Current => (TimePeriodKind::Floored, 0),
                TimePeriod::Previous => (TimePeriodKind::Floored, -1),
            };
            ClauseDefinition::Time {
                reference: c.reference.clone(),
                time_ranges: None,
                time_periods: Some(vec![TimePeriodDefinition {
                    kind,
                    duration: c.duration,
                    step,
                }]),
            }
        }
    }
}

// ============================================================================
// Splits
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitDefinition {
    #[serde(rename = "type")]
    pub kind: DimensionKind,
    pub dimension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<Bucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Sort on the split dimension when `ref` names it, else on a series key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDefinition {
    #[serde(rename = "ref")]
    pub reference: String,
    pub direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<SeriesDerivation>,
}

pub(crate) fn split_from_definition(
    definition: SplitDefinition,
    data_cube: &DataCube,
) -> Result<Split, ConversionError> {
    let dimension = data_cube
        .get_dimension(&definition.dimension)
        .ok_or_else(|| ConversionError::UnknownDimension(definition.dimension.clone()))?;
    let sort = definition.sort.map(|sort| {
        if sort.reference == definition.dimension {
            Sort::dimension(sort.reference, sort.direction)
        } else {
            Sort::Series(SeriesSort {
                reference: sort.reference,
                direction: sort.direction,
                period: sort.period.unwrap_or_default(),
            })
        }
    });
    Ok(Split {
        reference: dimension.name.clone(),
        kind: dimension.kind,
        bucket: definition.bucket,
        sort,
        limit: definition.limit,
    })
}

pub(crate) fn split_to_definition(split: &Split) -> SplitDefinition {
    let sort = split.sort.as_ref().map(|sort| match sort {
        Sort::Dimension(s) => SortDefinition {
            reference: s.reference.clone(),
            direction: s.direction,
            period: None,
        },
        Sort::Series(s) => SortDefinition {
            reference: s.reference.clone(),
            direction: s.direction,
            period: (s.period != SeriesDerivation::Current).then_some(s.period),
        },
    });
    SplitDefinition {
        kind: split.kind,
        dimension: split.reference.clone(),
        bucket: split.bucket,
        sort,
        limit: split.limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_cube::fixtures::wiki_cube;
    use serde_json::json;

    #[test]
    fn test_time_period_mapping() {
        let definition: ClauseDefinition = serde_json::from_value(json!({
            "type": "time",
            "ref": "time",
            "timePeriods": [{"type": "floored", "duration": "P1W", "step": -1}]
        }))
        .unwrap();
        let clause = clause_from_definition(definition.clone(), &wiki_cube()).unwrap();
        assert_eq!(
            clause,
            Clause::RelativeTime(RelativeTimeClause {
                reference: "time".to_string(),
                period: TimePeriod::Previous,
                duration: "P1W".parse().unwrap(),
            })
        );
        assert_eq!(clause_to_definition(&clause), definition);
    }

    #[test]
    fn test_unsupported_period_step() {
        let definition = ClauseDefinition::Time {
            reference: "time".to_string(),
            time_ranges: None,
            time_periods: Some(vec![TimePeriodDefinition {
                kind: TimePeriodKind::Floored,
                duration: "P1D".parse().unwrap(),
                step: 3,
            }]),
        };
        assert!(matches!(
            clause_from_definition(definition, &wiki_cube()),
            Err(ConversionError::InvalidClause { .. })
        ));
    }

    #[test]
    fn test_clause_on_unknown_dimension() {
        let definition = ClauseDefinition::String {
            reference: "country".to_string(),
            not: false,
            action: StringAction::In,
            values: vec!["fr".to_string()],
        };
        assert!(matches!(
            clause_from_definition(definition, &wiki_cube()),
            Err(ConversionError::UnknownDimension(name)) if name == "country"
        ));
    }

    #[test]
    fn test_split_sort_targets() {
        let cube = wiki_cube();
        let definition: SplitDefinition = serde_json::from_value(json!({
            "type": "string",
            "dimension": "channel",
            "sort": {"ref": "count", "direction": "descending", "period": "delta"},
            "limit": 10
        }))
        .unwrap();
        let split = split_from_definition(definition.clone(), &cube).unwrap();
        match &split.sort {
            Some(Sort::Series(sort)) => assert_eq!(sort.period, SeriesDerivation::Delta),
            other => panic!("unexpected sort {:?}", other),
        }
        assert_eq!(split_to_definition(&split), definition);

        let by_self: SplitDefinition = serde_json::from_value(json!({
            "type": "time",
            "dimension": "time",
            "bucket": "PT1H",
            "sort": {"ref": "time", "direction": "ascending"}
        }))
        .unwrap();
        let split = split_from_definition(by_self, &cube).unwrap();
        assert_eq!(split.sort, Some(Sort::dimension("time", SortDirection::Ascending)));
        assert_eq!(split.bucket, Some(Bucket::Duration("PT1H".parse().unwrap())));
    }
}
