//! Series variants and their keys

use std::fmt;

/// How values of a series are displayed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SeriesFormat {
    #[default]
    Default,
    Exact,
    Percent,
    /// Numeral-style pattern, e.g. "0,0.00"
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "add",
            ArithmeticOperation::Subtract => "subtract",
            ArithmeticOperation::Multiply => "multiply",
            ArithmeticOperation::Divide => "divide",
        }
    }
}

/// A calculation applied on top of a measure
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesExpression {
    PercentOfParent,
    PercentOfTotal,
    /// `measure <operation> operand`, where operand names another measure
    Arithmetic {
        operation: ArithmeticOperation,
        operand: String,
    },
}

impl SeriesExpression {
    pub fn key(&self) -> String {
        match self {
            SeriesExpression::PercentOfParent => "percent_of_parent".to_string(),
            SeriesExpression::PercentOfTotal => "percent_of_total".to_string(),
            SeriesExpression::Arithmetic { operation, operand } => {
                format!("{}__{}", operation.as_str(), operand)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeasureSeries {
    pub reference: String,
    pub format: SeriesFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuantileSeries {
    pub reference: String,
    pub percentile: u8,
    pub format: SeriesFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpressionSeries {
    pub reference: String,
    pub expression: SeriesExpression,
    pub format: SeriesFormat,
}

/// One requested output column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Series {
    Measure(MeasureSeries),
    Quantile(QuantileSeries),
    Expression(ExpressionSeries),
}

impl Series {
    /// Plain series on a measure
    pub fn from_measure(reference: impl Into<String>) -> Self {
        Series::Measure(MeasureSeries {
            reference: reference.into(),
            format: SeriesFormat::Default,
        })
    }

    /// Identity within a series list; splits sort on series by key
    pub fn key(&self) -> String {
        match self {
            Series::Measure(s) => s.reference.clone(),
            Series::Quantile(s) => format!("{}__p{}", s.reference, s.percentile),
            Series::Expression(s) => format!("{}__{}", s.reference, s.expression.key()),
        }
    }

    /// The measure this series is computed from
    pub fn reference(&self) -> &str {
        match self {
            Series::Measure(s) => &s.reference,
            Series::Quantile(s) => &s.reference,
            Series::Expression(s) => &s.reference,
        }
    }

    pub fn format(&self) -> &SeriesFormat {
        match self {
            Series::Measure(s) => &s.format,
            Series::Quantile(s) => &s.format,
            Series::Expression(s) => &s.format,
        }
    }

    /// Every measure the series needs from the cube
    pub fn measure_references(&self) -> Vec<&str> {
        match self {
            Series::Expression(ExpressionSeries {
                reference,
                expression: SeriesExpression::Arithmetic { operand, .. },
                ..
            }) => vec![reference.as_str(), operand.as_str()],
            other => vec![other.reference()],
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
