//! Query expression trees as stored by version 2 links

use serde::{Deserialize, Serialize};

use crate::filter::{BooleanValue, DateRange, NumberRange};
use crate::time::Duration;

/// The `$n` reference: "now"
pub const NOW_REFERENCE: &str = "n";
/// The `$m` reference: the cube's max ingested time
pub const MAX_TIME_REFERENCE: &str = "m";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Expression {
    Literal {
        value: LiteralValue,
    },
    Ref {
        name: String,
    },
    And {
        operand: Box<Expression>,
        expression: Box<Expression>,
    },
    Not {
        operand: Box<Expression>,
    },
    Overlap {
        operand: Box<Expression>,
        expression: Box<Expression>,
    },
    Contains {
        operand: Box<Expression>,
        expression: Box<Expression>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        compare: Option<String>,
    },
    Match {
        operand: Box<Expression>,
        regexp: String,
    },
    TimeFloor {
        operand: Box<Expression>,
        duration: Duration,
    },
    TimeRange {
        operand: Box<Expression>,
        duration: Duration,
        step: i32,
    },
    TimeBucket {
        operand: Box<Expression>,
        duration: Duration,
    },
    NumberBucket {
        operand: Box<Expression>,
        size: f64,
        #[serde(default)]
        offset: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Set(LiteralSet),
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "setType", content = "elements", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiteralSet {
    String(Vec<String>),
    Boolean(Vec<BooleanValue>),
    NumberRange(Vec<NumberRange>),
    TimeRange(Vec<DateRange>),
}

impl Expression {
    pub fn reference(name: impl Into<String>) -> Self {
        Expression::Ref { name: name.into() }
    }

    pub fn literal(value: LiteralValue) -> Self {
        Expression::Literal { value }
    }

    /// Name of a bare reference
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Expression::Ref { name } => Some(name),
            _ => None,
        }
    }

    /// Conjuncts of a chain of `and`s; the literal `true` has none
    pub fn conjuncts(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal {
                value: LiteralValue::Bool(true),
            } => Vec::new(),
            Expression::And {
                operand,
                expression,
            } => {
                let mut parts = operand.conjuncts();
                parts.extend(expression.conjuncts());
                parts
            }
            other => vec![other],
        }
    }

    /// Short label used in error messages
    pub fn op(&self) -> &'static str {
        match self {
            Expression::Literal { .. } => "literal",
            Expression::Ref { .. } => "ref",
            Expression::And { .. } => "and",
            Expression::Not { .. } => "not",
            Expression::Overlap { .. } => "overlap",
            Expression::Contains { .. } => "contains",
            Expression::Match { .. } => "match",
            Expression::TimeFloor { .. } => "timeFloor",
            Expression::TimeRange { .. } => "timeRange",
            Expression::TimeBucket { .. } => "timeBucket",
            Expression::NumberBucket { .. } => "numberBucket",
        }
    }
}
