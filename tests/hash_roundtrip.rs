//! Essences survive a trip through the URL hash unchanged

mod common;

use std::sync::Arc;

use common::cube;
use cubeview::filter::{
    BooleanClause, BooleanValue, DateRange, FixedTimeClause, NumberClause, NumberRange,
    RelativeTimeClause, StringAction, StringClause, TimePeriod,
};
use cubeview::series::{
    ArithmeticOperation, ExpressionSeries, QuantileSeries, SeriesExpression, SeriesFormat,
};
use cubeview::splits::{SeriesDerivation, SeriesSort};
use cubeview::visualization::{LineChartSettings, TableSettings};
use cubeview::{
    essence_from_hash, essence_from_hash_or_default, to_hash, Bucket, Clause, DataCube, Essence,
    Filter, Series, Sort, SortDirection, Split, TimeShift, VisStrategy, Visualization,
    VisualizationSettings,
};

fn assert_round_trip(essence: &Essence, data_cube: &Arc<DataCube>) {
    let hash = to_hash(essence).unwrap();
    assert!(hash.starts_with("4/"));
    let decoded = essence_from_hash(&hash, Arc::clone(data_cube)).unwrap();
    assert_eq!(&decoded, essence, "hash {}", hash);
}

fn split_on(essence: &Essence, name: &str) -> Split {
    Split::from_dimension(essence.data_cube().get_dimension(name).unwrap())
}

#[test]
fn test_defaults() {
    for name in ["wiki", "labels", "edits"] {
        let cube = cube(name);
        assert_round_trip(&Essence::from_data_cube(cube.clone()), &cube);
    }
}

#[test]
fn test_every_clause_kind() {
    let cube = cube("wiki");
    let filter = Filter::from_clauses(vec![
        Clause::RelativeTime(RelativeTimeClause {
            reference: "time".to_string(),
            period: TimePeriod::Previous,
            duration: "P1M".parse().unwrap(),
        }),
        Clause::String(StringClause {
            reference: "channel".to_string(),
            action: StringAction::In,
            values: ["en".to_string(), "fr".to_string()].into_iter().collect(),
            not: true,
        }),
        Clause::String(StringClause {
            reference: "page".to_string(),
            action: StringAction::Contains,
            values: ["Talk".to_string()].into_iter().collect(),
            not: false,
        }),
        Clause::Boolean(BooleanClause {
            reference: "isRobot".to_string(),
            values: [BooleanValue::Bool(false), BooleanValue::Text("null".to_string())]
                .into_iter()
                .collect(),
            not: false,
        }),
        Clause::Number(NumberClause {
            reference: "commentLength".to_string(),
            ranges: vec![
                NumberRange::new(None, Some(10.0)),
                NumberRange::new(Some(100.0), None),
            ],
            not: false,
        }),
    ]);
    let essence = Essence::from_data_cube(cube.clone()).change_filter(filter);
    assert_eq!(essence.filter().len(), 5);
    assert_round_trip(&essence, &cube);
}

#[test]
fn test_nested_splits_and_settings() {
    let cube = cube("wiki");
    let essence = Essence::from_data_cube(cube.clone());
    let essence = essence
        .add_split(split_on(&essence, "channel"), VisStrategy::FairGame)
        .add_split(split_on(&essence, "isRobot"), VisStrategy::FairGame);
    assert_eq!(essence.visualization(), Visualization::Table);
    let essence = essence.change_visualization_settings(VisualizationSettings::Table(
        TableSettings {
            collapse_rows: true,
        },
    ));
    assert_round_trip(&essence, &cube);

    let delta_sorted = essence.change_split(
        &essence.splits().get(0).unwrap().clone(),
        essence
            .splits()
            .get(0)
            .unwrap()
            .change_sort(Some(Sort::Series(SeriesSort {
                reference: "count".to_string(),
                direction: SortDirection::Ascending,
                period: SeriesDerivation::Delta,
            }))),
        VisStrategy::KeepAlways,
    );
    assert_round_trip(&delta_sorted, &cube);
}

#[test]
fn test_comparison_and_series_kinds() {
    let cube = cube("wiki");
    let essence = Essence::from_data_cube(cube.clone()).change_filter(Filter::from_clauses(vec![
        Clause::FixedTime(FixedTimeClause {
            reference: "time".to_string(),
            ranges: vec![DateRange::new(
                "2016-01-10T00:00:00Z".parse().unwrap(),
                "2016-01-12T00:00:00Z".parse().unwrap(),
            )],
        }),
    ]));
    let essence = essence
        .add_split(split_on(&essence, "time"), VisStrategy::FairGame)
        .change_comparison_shift(TimeShift::parse("P2D").unwrap())
        .add_series(Series::Quantile(QuantileSeries {
            reference: "delta".to_string(),
            percentile: 99,
            format: SeriesFormat::Custom("0.00".to_string()),
        }))
        .add_series(Series::Expression(ExpressionSeries {
            reference: "added".to_string(),
            expression: SeriesExpression::Arithmetic {
                operation: ArithmeticOperation::Divide,
                operand: "count".to_string(),
            },
            format: SeriesFormat::Default,
        }))
        .change_visualization_settings(VisualizationSettings::LineChart(LineChartSettings {
            group_series: true,
        }));

    assert_eq!(essence.visualization(), Visualization::LineChart);
    assert!(essence.has_comparison());
    assert_eq!(
        essence.splits().get(0).unwrap().bucket,
        Some(Bucket::Duration("PT1H".parse().unwrap()))
    );
    assert_eq!(essence.series().len(), 4);
    assert_round_trip(&essence, &cube);
}

#[test]
fn test_timezone_and_pins() {
    let cube = cube("wiki");
    let essence = Essence::from_data_cube(cube.clone())
        .change_timezone(chrono_tz::Asia::Kolkata)
        .pin("page")
        .unpin("channel")
        .change_pinned_sort_series("deleted");
    assert_round_trip(&essence, &cube);
}

#[test]
fn test_decoding_against_changed_cube() {
    let wiki = cube("wiki");
    let essence = Essence::from_data_cube(wiki.clone());
    let essence = essence.add_split(split_on(&essence, "page"), VisStrategy::FairGame);
    let hash = to_hash(&essence).unwrap();

    // the labels cube has no page dimension or added measure
    let labels = cube("labels");
    assert!(essence_from_hash(&hash, labels.clone()).is_err());
    let fallback = essence_from_hash_or_default(&hash, labels.clone());
    assert_eq!(fallback, Essence::from_data_cube(labels));
}
