//! Version 4: the current link format

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::definitions::{
    clause_from_definition, clause_to_definition, split_from_definition, split_to_definition,
    ClauseDefinition, SplitDefinition,
};
use super::error::ConversionError;
use super::{ViewDefinitionDecoder, ViewDefinitionEncoder, ViewDefinitionVersion};
use crate::data_cube::DataCube;
use crate::essence::{Essence, EssenceParams};
use crate::filter::Filter;
use crate::series::{
    ArithmeticOperation, ExpressionSeries, MeasureSeries, QuantileSeries, Series,
    SeriesExpression, SeriesFormat, SeriesList,
};
use crate::splits::Splits;
use crate::time::parse_timezone;
use crate::time_shift::TimeShift;
use crate::visualization::{Visualization, VisualizationSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition4 {
    pub visualization: Visualization,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_settings: Option<serde_json::Value>,
    pub timezone: String,
    #[serde(default)]
    pub filters: Vec<ClauseDefinition>,
    #[serde(default)]
    pub splits: Vec<SplitDefinition>,
    #[serde(default)]
    pub series: Vec<SeriesDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pinned_dimensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_shift: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SeriesDefinition {
    Measure {
        reference: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<FormatDefinition>,
    },
    Quantile {
        reference: String,
        percentile: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<FormatDefinition>,
    },
    Expression {
        reference: String,
        expression: ExpressionDefinition,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<FormatDefinition>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FormatDefinition {
    Default,
    Exact,
    Percent,
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ExpressionDefinition {
    PercentOfParent,
    PercentOfTotal,
    Add { reference: String },
    Subtract { reference: String },
    Multiply { reference: String },
    Divide { reference: String },
}

fn format_to_definition(format: &SeriesFormat) -> Option<FormatDefinition> {
    match format {
        SeriesFormat::Default => None,
        SeriesFormat::Exact => Some(FormatDefinition::Exact),
        SeriesFormat::Percent => Some(FormatDefinition::Percent),
        SeriesFormat::Custom(pattern) => Some(FormatDefinition::Custom(pattern.clone())),
    }
}

fn format_from_definition(format: Option<FormatDefinition>) -> SeriesFormat {
    match format {
        None | Some(FormatDefinition::Default) => SeriesFormat::Default,
        Some(FormatDefinition::Exact) => SeriesFormat::Exact,
        Some(FormatDefinition::Percent) => SeriesFormat::Percent,
        Some(FormatDefinition::Custom(pattern)) => SeriesFormat::Custom(pattern),
    }
}

fn series_from_definition(definition: SeriesDefinition) -> Series {
    match definition {
        SeriesDefinition::Measure { reference, format } => Series::Measure(MeasureSeries {
            reference,
            format: format_from_definition(format),
        }),
        SeriesDefinition::Quantile {
            reference,
            percentile,
            format,
        } => Series::Quantile(QuantileSeries {
            reference,
            percentile,
            format: format_from_definition(format),
        }),
        SeriesDefinition::Expression {
            reference,
            expression,
            format,
        } => {
            let arithmetic = |operation, operand| SeriesExpression::Arithmetic { operation, operand };
            let expression = match expression {
                ExpressionDefinition::PercentOfParent => SeriesExpression::PercentOfParent,
                ExpressionDefinition::PercentOfTotal => SeriesExpression::PercentOfTotal,
                ExpressionDefinition::Add { reference } => {
                    arithmetic(ArithmeticOperation::Add, reference)
                }
                ExpressionDefinition::Subtract { reference } => {
                    arithmetic(ArithmeticOperation::Subtract, reference)
                }
                ExpressionDefinition::Multiply { reference } => {
                    arithmetic(ArithmeticOperation::Multiply, reference)
                }
                ExpressionDefinition::Divide { reference } => {
                    arithmetic(ArithmeticOperation::Divide, reference)
                }
            };
            Series::Expression(ExpressionSeries {
                reference,
                expression,
                format: format_from_definition(format),
            })
        }
    }
}

fn series_to_definition(series: &Series) -> SeriesDefinition {
    match series {
        Series::Measure(s) => SeriesDefinition::Measure {
            reference: s.reference.clone(),
            format: format_to_definition(&s.format),
        },
        Series::Quantile(s) => SeriesDefinition::Quantile {
            reference: s.reference.clone(),
            percentile: s.percentile,
            format: format_to_definition(&s.format),
        },
        Series::Expression(s) => {
            let expression = match &s.expression {
                SeriesExpression::PercentOfParent => ExpressionDefinition::PercentOfParent,
                SeriesExpression::PercentOfTotal => ExpressionDefinition::PercentOfTotal,
                SeriesExpression::Arithmetic { operation, operand } => {
                    let reference = operand.clone();
                    match operation {
                        ArithmeticOperation::Add => ExpressionDefinition::Add { reference },
                        ArithmeticOperation::Subtract => {
                            ExpressionDefinition::Subtract { reference }
                        }
                        ArithmeticOperation::Multiply => {
                            ExpressionDefinition::Multiply { reference }
                        }
                        ArithmeticOperation::Divide => ExpressionDefinition::Divide { reference },
                    }
                }
            };
            SeriesDefinition::Expression {
                reference: s.reference.clone(),
                expression,
                format: format_to_definition(&s.format),
            }
        }
    }
}

pub struct ViewDefinitionConverter4;

impl ViewDefinitionDecoder for ViewDefinitionConverter4 {
    const VERSION: ViewDefinitionVersion = ViewDefinitionVersion::V4;

    type Definition = ViewDefinition4;

    fn from_view_definition(
        definition: ViewDefinition4,
        data_cube: Arc<DataCube>,
    ) -> Result<Essence, ConversionError> {
        let timezone = parse_timezone(&definition.timezone)?;
        let time_shift = TimeShift::parse(definition.time_shift.as_deref().unwrap_or_default())?;
        let clauses = definition
            .filters
            .into_iter()
            .map(|clause| clause_from_definition(clause, &data_cube))
            .collect::<Result<Vec<_>, _>>()?;
        let splits = definition
            .splits
            .into_iter()
            .map(|split| split_from_definition(split, &data_cube))
            .collect::<Result<Vec<_>, _>>()?;
        let series = definition
            .series
            .into_iter()
            .map(series_from_definition)
            .collect();
        let settings = VisualizationSettings::from_json(
            definition.visualization,
            definition.visualization_settings.as_ref(),
        );

        Ok(Essence::new(EssenceParams {
            visualization: Some(definition.visualization),
            visualization_settings: Some(settings),
            timezone: Some(timezone),
            filter: Filter::from_clauses(clauses),
            time_shift,
            splits: Splits::from_splits(splits),
            series: SeriesList::from_series(series),
            pinned_dimensions: definition.pinned_dimensions,
            pinned_sort: definition.pinned_sort,
            data_cube,
        }))
    }
}

impl ViewDefinitionEncoder for ViewDefinitionConverter4 {
    fn to_view_definition(essence: &Essence) -> ViewDefinition4 {
        ViewDefinition4 {
            visualization: essence.visualization(),
            visualization_settings: essence.visualization_settings().to_json(),
            timezone: essence.timezone().name().to_string(),
            filters: essence.filter().iter().map(clause_to_definition).collect(),
            splits: essence.splits().iter().map(split_to_definition).collect(),
            series: essence.series().iter().map(series_to_definition).collect(),
            pinned_dimensions: essence.pinned_dimensions().to_vec(),
            pinned_sort: essence.pinned_sort().map(str::to_string),
            time_shift: essence.time_shift().value().map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_cube::fixtures::wiki_cube;
    use crate::essence::VisStrategy;
    use crate::filter::{Clause, DateRange, FixedTimeClause, NumberClause, NumberRange};
    use crate::splits::Split;
    use crate::visualization::LineChartSettings;
    use serde_json::json;

    #[test]
    fn test_decode_full_definition() {
        let essence = ViewDefinitionConverter4::decode_json(
            json!({
                "visualization": "line-chart",
                "visualizationSettings": {"groupSeries": true},
                "timezone": "America/New_York",
                "filters": [
                    {"type": "time", "ref": "time", "timeRanges": [
                        {"start": "2016-01-01T00:00:00Z", "end": "2016-01-11T00:00:00Z"}
                    ]},
                    {"type": "string", "ref": "channel", "action": "in", "values": ["en"]}
                ],
                "splits": [
                    {"type": "time", "dimension": "time", "bucket": "P1D",
                     "sort": {"ref": "time", "direction": "ascending"}}
                ],
                "series": [
                    {"type": "measure", "reference": "count"},
                    {"type": "quantile", "reference": "added", "percentile": 98, "format": {"type": "exact"}},
                    {"type": "expression", "reference": "added",
                     "expression": {"operation": "subtract", "reference": "deleted"}},
                    {"type": "expression", "reference": "count",
                     "expression": {"operation": "percentOfTotal"},
                     "format": {"type": "custom", "value": "0.0%"}}
                ],
                "pinnedDimensions": ["page"],
                "timeShift": "P10D"
            }),
            wiki_cube(),
        )
        .unwrap();

        assert_eq!(essence.visualization(), Visualization::LineChart);
        assert!(essence.is_renderable());
        assert_eq!(
            essence.visualization_settings(),
            &VisualizationSettings::LineChart(LineChartSettings { group_series: true })
        );
        assert_eq!(
            essence.series().keys(),
            vec!["count", "added__p98", "added__subtract__deleted", "count__percent_of_total"]
        );
        assert_eq!(essence.series().series()[1].format(), &SeriesFormat::Exact);
        assert_eq!(essence.time_shift().to_string(), "P10D");
        assert_eq!(essence.pinned_dimensions(), ["page".to_string()]);
        // no pinned sort in the link: the cube default applies
        assert_eq!(essence.pinned_sort(), Some("count"));
    }

    #[test]
    fn test_round_trip_through_json() {
        let cube = wiki_cube();
        let essence = Essence::from_data_cube(cube.clone())
            .change_filter(Filter::from_clauses(vec![
                Clause::FixedTime(FixedTimeClause {
                    reference: "time".to_string(),
                    ranges: vec![DateRange::new(
                        "2016-01-01T00:00:00Z".parse().unwrap(),
                        "2016-01-03T00:00:00Z".parse().unwrap(),
                    )],
                }),
                Clause::Number(NumberClause {
                    reference: "commentLength".to_string(),
                    ranges: vec![NumberRange::new(Some(0.0), Some(200.0))],
                    not: true,
                }),
            ]))
            .change_comparison_shift(TimeShift::parse("P1W").unwrap());
        let essence = essence
            .add_split(
                Split::from_dimension(cube.get_dimension("commentLength").unwrap()),
                VisStrategy::FairGame,
            )
            .pin("isRobot");

        let json = serde_json::to_value(ViewDefinitionConverter4::to_view_definition(&essence))
            .unwrap();
        let decoded = ViewDefinitionConverter4::decode_json(json, cube).unwrap();
        assert_eq!(decoded, essence);
    }

    #[test]
    fn test_encoded_shape() {
        let essence = Essence::from_data_cube(wiki_cube());
        let json = serde_json::to_value(ViewDefinitionConverter4::to_view_definition(&essence))
            .unwrap();
        assert_eq!(
            json,
            json!({
                "visualization": "totals",
                "timezone": "Etc/UTC",
                "filters": [{
                    "type": "time",
                    "ref": "time",
                    "timePeriods": [{"type": "latest", "duration": "P3D", "step": -1}]
                }],
                "splits": [],
                "series": [
                    {"type": "measure", "reference": "count"},
                    {"type": "measure", "reference": "added"}
                ],
                "pinnedDimensions": ["channel"],
                "pinnedSort": "count"
            })
        );
    }

    #[test]
    fn test_bad_timezone_and_shift() {
        let bad_tz = ViewDefinitionConverter4::decode_json(
            json!({"visualization": "totals", "timezone": "Mars/Olympus"}),
            wiki_cube(),
        );
        assert!(matches!(bad_tz, Err(ConversionError::Time(_))));

        let bad_shift = ViewDefinitionConverter4::decode_json(
            json!({"visualization": "totals", "timezone": "Etc/UTC", "timeShift": "soon"}),
            wiki_cube(),
        );
        assert!(matches!(bad_shift, Err(ConversionError::Time(_))));
    }
}
