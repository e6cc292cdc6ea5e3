//! Series model: the measure-derived columns a view requests

#[allow(clippy::module_inception)]
mod series;
mod series_list;

pub use series::{
    ArithmeticOperation, ExpressionSeries, MeasureSeries, QuantileSeries, Series,
    SeriesExpression, SeriesFormat,
};
pub use series_list::SeriesList;
