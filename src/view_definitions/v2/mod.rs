//! Version 2: filters and splits stored as query expressions
//!
//! Read-only. Links in this format are still decoded but never produced.

mod expression;

pub use expression::{Expression, LiteralSet, LiteralValue, MAX_TIME_REFERENCE, NOW_REFERENCE};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::ConversionError;
use super::{ViewDefinitionDecoder, ViewDefinitionVersion};
use crate::data_cube::DataCube;
use crate::essence::{Essence, EssenceParams};
use crate::filter::{
    BooleanClause, Clause, FixedTimeClause, Filter, NumberClause, RelativeTimeClause,
    StringAction, StringClause, TimePeriod,
};
use crate::series::SeriesList;
use crate::splits::{Bucket, SeriesSort, Sort, SortDirection, Split, Splits};
use crate::time::{parse_timezone, Duration};
use crate::time_shift::TimeShift;
use crate::visualization::Visualization;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition2 {
    /// Legacy links carry the visualization in the hash prefix instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Visualization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub filter: Expression,
    #[serde(default)]
    pub splits: Vec<SplitCombine>,
    #[serde(default)]
    pub selected_measures: Vec<String>,
    #[serde(default)]
    pub pinned_dimensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_sort: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitCombine {
    pub expression: Expression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_action: Option<SortAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_action: Option<LimitAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortAction {
    pub expression: Expression,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitAction {
    pub value: u32,
}

pub struct ViewDefinitionConverter2;

impl ViewDefinitionDecoder for ViewDefinitionConverter2 {
    const VERSION: ViewDefinitionVersion = ViewDefinitionVersion::V2;

    type Definition = ViewDefinition2;

    fn from_view_definition(
        definition: ViewDefinition2,
        data_cube: Arc<DataCube>,
    ) -> Result<Essence, ConversionError> {
        let timezone = definition
            .timezone
            .as_deref()
            .map(parse_timezone)
            .transpose()?;
        let clauses = definition
            .filter
            .conjuncts()
            .into_iter()
            .map(|expression| clause_from_expression(expression, &data_cube))
            .collect::<Result<Vec<_>, _>>()?;
        let splits = definition
            .splits
            .iter()
            .map(|combine| split_from_combine(combine, &data_cube))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Essence::new(EssenceParams {
            visualization: definition.visualization,
            visualization_settings: None,
            timezone,
            filter: Filter::from_clauses(clauses),
            time_shift: TimeShift::empty(),
            splits: Splits::from_splits(splits),
            series: SeriesList::from_measures(definition.selected_measures),
            pinned_dimensions: definition.pinned_dimensions,
            pinned_sort: definition.pinned_sort,
            data_cube,
        }))
    }
}

/// The dimension an expression is rooted at
fn dimension_of<'a>(
    expression: &'a Expression,
    data_cube: &DataCube,
) -> Result<&'a str, ConversionError> {
    let name = expression
        .as_reference()
        .ok_or_else(|| ConversionError::UnsupportedExpression(expression.op().to_string()))?;
    if data_cube.get_dimension(name).is_none() {
        return Err(ConversionError::UnknownDimension(name.to_string()));
    }
    Ok(name)
}

fn clause_from_expression(
    expression: &Expression,
    data_cube: &DataCube,
) -> Result<Clause, ConversionError> {
    let unsupported = || ConversionError::UnsupportedExpression(expression.op().to_string());
    match expression {
        Expression::Not { operand } => negate(clause_from_expression(operand, data_cube)?),
        Expression::Overlap {
            operand,
            expression: target,
        } => {
            let reference = dimension_of(operand, data_cube)?.to_string();
            match target.as_ref() {
                Expression::Literal {
                    value: LiteralValue::Set(set),
                } => Ok(clause_from_set(reference, set.clone())),
                Expression::TimeRange {
                    operand: anchor,
                    duration,
                    step,
                } => relative_from_time_range(reference, anchor, *duration, *step)
                    .ok_or_else(unsupported),
                _ => Err(unsupported()),
            }
        }
        Expression::Contains {
            operand,
            expression: target,
            ..
        } => match target.as_ref() {
            Expression::Literal {
                value: LiteralValue::String(value),
            } => Ok(Clause::String(StringClause {
                reference: dimension_of(operand, data_cube)?.to_string(),
                action: StringAction::Contains,
                values: [value.clone()].into_iter().collect(),
                not: false,
            })),
            _ => Err(unsupported()),
        },
        Expression::Match { operand, regexp } => Ok(Clause::String(StringClause {
            reference: dimension_of(operand, data_cube)?.to_string(),
            action: StringAction::Match,
            values: [regexp.clone()].into_iter().collect(),
            not: false,
        })),
        _ => Err(unsupported()),
    }
}

fn clause_from_set(reference: String, set: LiteralSet) -> Clause {
    match set {
        LiteralSet::String(values) => Clause::String(StringClause {
            reference,
            action: StringAction::In,
            values: values.into_iter().collect(),
            not: false,
        }),
        LiteralSet::Boolean(values) => Clause::Boolean(BooleanClause {
            reference,
            values: values.into_iter().collect(),
            not: false,
        }),
        LiteralSet::NumberRange(ranges) => Clause::Number(NumberClause {
            reference,
            ranges,
            not: false,
        }),
        LiteralSet::TimeRange(ranges) => Clause::FixedTime(FixedTimeClause { reference, ranges }),
    }
}

/// `timeRange(timeFloor($m|$n, d), d, step)`
fn relative_from_time_range(
    reference: String,
    anchor: &Expression,
    duration: Duration,
    step: i32,
) -> Option<Clause> {
    let Expression::TimeFloor {
        operand,
        duration: floor,
    } = anchor
    else {
        return None;
    };
    if *floor != duration {
        return None;
    }
    let period = match (operand.as_reference()?, step) {
        (MAX_TIME_REFERENCE, -1) => TimePeriod::Latest,
        (NOW_REFERENCE, 1) => TimePeriod::Current,
        (NOW_REFERENCE, -1) => TimePeriod::Previous,
        _ => return None,
    };
    Some(Clause::RelativeTime(RelativeTimeClause {
        reference,
        period,
        duration,
    }))
}

fn negate(clause: Clause) -> Result<Clause, ConversionError> {
    match clause {
        Clause::String(c) => Ok(Clause::String(StringClause { not: !c.not, ..c })),
        Clause::Boolean(c) => Ok(Clause::Boolean(BooleanClause { not: !c.not, ..c })),
        Clause::Number(c) => Ok(Clause::Number(NumberClause { not: !c.not, ..c })),
        Clause::FixedTime(c) => Err(ConversionError::InvalidClause {
            reference: c.reference,
            message: "time clauses cannot be negated".to_string(),
        }),
        Clause::RelativeTime(c) => Err(ConversionError::InvalidClause {
            reference: c.reference,
            message: "time clauses cannot be negated".to_string(),
        }),
    }
}

fn split_from_combine(combine: &SplitCombine, data_cube: &DataCube) -> Result<Split, ConversionError> {
    let (reference, bucket) = match &combine.expression {
        Expression::Ref { .. } => (dimension_of(&combine.expression, data_cube)?, None),
        Expression::TimeBucket { operand, duration } => (
            dimension_of(operand, data_cube)?,
            Some(Bucket::Duration(*duration)),
        ),
        Expression::NumberBucket { operand, size, .. } => {
            (dimension_of(operand, data_cube)?, Some(Bucket::Number(*size)))
        }
        other => return Err(ConversionError::UnsupportedExpression(other.op().to_string())),
    };
    let sort = match &combine.sort_action {
        Some(action) => {
            let target = action.expression.as_reference().ok_or_else(|| {
                ConversionError::UnsupportedExpression(action.expression.op().to_string())
            })?;
            Some(if target == reference {
                Sort::dimension(target, action.direction)
            } else {
                Sort::Series(SeriesSort {
                    reference: target.to_string(),
                    direction: action.direction,
                    period: Default::default(),
                })
            })
        }
        None => None,
    };
    let kind = data_cube
        .get_dimension(reference)
        .map(|d| d.kind)
        .ok_or_else(|| ConversionError::UnknownDimension(reference.to_string()))?;
    Ok(Split {
        reference: reference.to_string(),
        kind,
        bucket,
        sort,
        limit: combine.limit_action.map(|l| l.value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_cube::fixtures::wiki_cube;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<Essence, ConversionError> {
        ViewDefinitionConverter2::decode_json(value, wiki_cube())
    }

    #[test]
    fn test_decode_filter_and_splits() {
        let essence = decode(json!({
            "visualization": "table",
            "timezone": "Europe/Paris",
            "filter": {
                "op": "and",
                "operand": {
                    "op": "overlap",
                    "operand": {"op": "ref", "name": "time"},
                    "expression": {
                        "op": "timeRange",
                        "operand": {"op": "timeFloor", "operand": {"op": "ref", "name": "m"}, "duration": "P1D"},
                        "duration": "P1D",
                        "step": -1
                    }
                },
                "expression": {
                    "op": "not",
                    "operand": {
                        "op": "overlap",
                        "operand": {"op": "ref", "name": "channel"},
                        "expression": {"op": "literal", "value": {"setType": "STRING", "elements": ["en", "de"]}}
                    }
                }
            },
            "splits": [{
                "expression": {"op": "ref", "name": "channel"},
                "sortAction": {"expression": {"op": "ref", "name": "added"}, "direction": "descending"},
                "limitAction": {"value": 10}
            }],
            "selectedMeasures": ["count", "added"],
            "pinnedDimensions": ["page"],
            "pinnedSort": "added"
        }))
        .unwrap();

        assert_eq!(essence.visualization(), Visualization::Table);
        assert_eq!(essence.timezone().name(), "Europe/Paris");
        assert_eq!(
            essence.filter().clause_for_reference("time"),
            Some(&Clause::RelativeTime(RelativeTimeClause {
                reference: "time".to_string(),
                period: TimePeriod::Latest,
                duration: "P1D".parse().unwrap(),
            }))
        );
        match essence.filter().clause_for_reference("channel") {
            Some(Clause::String(c)) => {
                assert!(c.not);
                assert_eq!(c.values.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        let split = essence.splits().get(0).unwrap();
        assert_eq!(split.sort, Some(Sort::series("added", SortDirection::Descending)));
        assert_eq!(split.limit, Some(10));
        assert_eq!(essence.series().keys(), vec!["count", "added"]);
        assert_eq!(essence.pinned_dimensions(), ["page".to_string()]);
        assert_eq!(essence.pinned_sort(), Some("added"));
    }

    #[test]
    fn test_decode_buckets_and_string_matches() {
        let essence = decode(json!({
            "filter": {
                "op": "and",
                "operand": {
                    "op": "contains",
                    "operand": {"op": "ref", "name": "page"},
                    "expression": {"op": "literal", "value": "Obama"},
                    "compare": "ignoreCase"
                },
                "expression": {"op": "match", "operand": {"op": "ref", "name": "channel"}, "regexp": "^e"}
            },
            "splits": [
                {"expression": {"op": "timeBucket", "operand": {"op": "ref", "name": "time"}, "duration": "PT1H"}},
                {"expression": {"op": "numberBucket", "operand": {"op": "ref", "name": "commentLength"}, "size": 5}}
            ],
            "selectedMeasures": ["count"]
        }))
        .unwrap();

        assert_eq!(essence.filter().len(), 2);
        assert_eq!(
            essence.splits().get(0).unwrap().bucket,
            Some(Bucket::Duration("PT1H".parse().unwrap()))
        );
        assert_eq!(essence.splits().get(1).unwrap().bucket, Some(Bucket::Number(5.0)));
        // no visualization in the payload: the best one is picked
        assert_eq!(essence.visualization(), Visualization::LineChart);
    }

    #[test]
    fn test_unknown_dimension_fails() {
        let result = decode(json!({
            "filter": {"op": "literal", "value": true},
            "splits": [{"expression": {"op": "ref", "name": "country"}}]
        }));
        assert!(matches!(result, Err(ConversionError::UnknownDimension(name)) if name == "country"));
    }

    #[test]
    fn test_unsupported_expression_fails() {
        let result = decode(json!({
            "filter": {"op": "ref", "name": "channel"}
        }));
        assert!(matches!(result, Err(ConversionError::UnsupportedExpression(_))));

        let malformed = decode(json!({"filter": 3}));
        assert!(matches!(
            malformed,
            Err(ConversionError::Malformed { version: ViewDefinitionVersion::V2, .. })
        ));
    }
}
