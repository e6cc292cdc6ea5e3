//! Filter clauses: one predicate bound to one dimension reference

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::error::ClauseError;
use crate::time::{Duration, DurationUnit};

// ============================================================================
// Clause variants
// ============================================================================

/// How a string clause compares values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringAction {
    In,
    Contains,
    /// Regular expression; the clause holds exactly one pattern
    Match,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringClause {
    pub reference: String,
    pub action: StringAction,
    pub values: BTreeSet<String>,
    pub not: bool,
}

/// Boolean dimensions sometimes carry string literals ("true", "null")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BooleanValue {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanClause {
    pub reference: String,
    pub values: BTreeSet<BooleanValue>,
    pub not: bool,
}

/// Which ends of a number range are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bounds {
    /// `[)`
    #[default]
    ClosedOpen,
    /// `[]`
    Closed,
    /// `()`
    Open,
    /// `(]`
    OpenClosed,
}

impl Bounds {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bounds::ClosedOpen => "[)",
            Bounds::Closed => "[]",
            Bounds::Open => "()",
            Bounds::OpenClosed => "(]",
        }
    }

    fn start_inclusive(&self) -> bool {
        matches!(self, Bounds::ClosedOpen | Bounds::Closed)
    }

    fn end_inclusive(&self) -> bool {
        matches!(self, Bounds::Closed | Bounds::OpenClosed)
    }
}

impl FromStr for Bounds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "[)" => Ok(Bounds::ClosedOpen),
            "[]" => Ok(Bounds::Closed),
            "()" => Ok(Bounds::Open),
            "(]" => Ok(Bounds::OpenClosed),
            _ => Err(format!("Invalid bounds '{}'", s)),
        }
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Bounds::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A number range; a missing end is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
    #[serde(default)]
    pub bounds: Bounds,
}

impl NumberRange {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            start,
            end,
            bounds: Bounds::default(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let after_start = match self.start {
            Some(start) if self.bounds.start_inclusive() => value >= start,
            Some(start) => value > start,
            None => true,
        };
        let before_end = match self.end {
            Some(end) if self.bounds.end_inclusive() => value <= end,
            Some(end) => value < end,
            None => true,
        };
        after_start && before_end
    }

    /// Width of the range, when both ends are known
    pub fn span(&self) -> Option<f64> {
        Some(self.end? - self.start?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberClause {
    pub reference: String,
    pub ranges: Vec<NumberRange>,
    pub not: bool,
}

/// A half-open interval of instants: `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    pub fn length_millis(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    /// Move both ends by `step` times `duration`; `None` when either end
    /// leaves the representable range
    pub fn shift(&self, duration: &Duration, tz: Tz, step: i32) -> Option<DateRange> {
        Some(DateRange {
            start: duration.shift(self.start, tz, step)?,
            end: duration.shift(self.end, tz, step)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTimeClause {
    pub reference: String,
    pub ranges: Vec<DateRange>,
}

/// Which window a relative time clause selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePeriod {
    /// The period containing "now"
    Current,
    /// The period just before the current one
    Previous,
    /// The `duration` leading up to the cube's max ingested time
    Latest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeTimeClause {
    pub reference: String,
    pub period: TimePeriod,
    pub duration: Duration,
}

impl RelativeTimeClause {
    /// Pin this clause to concrete instants.
    ///
    /// `Latest` anchors on the minute after the floored max time (falling
    /// back to `now` when the max time is unknown); `Current` and `Previous`
    /// anchor on `now` floored to the duration in `tz`. Ends that cannot be
    /// represented clamp to the earliest or latest instant.
    pub fn evaluate(
        &self,
        now: DateTime<Utc>,
        max_time: Option<DateTime<Utc>>,
        tz: Tz,
    ) -> FixedTimeClause {
        let range = match self.period {
            TimePeriod::Latest => {
                let minute = Duration::of(1, DurationUnit::Minute);
                let floored = minute.floor(max_time.unwrap_or(now), tz);
                let anchor = minute.shift(floored, tz, 1).unwrap_or(DateTime::<Utc>::MAX_UTC);
                DateRange::new(self.back(anchor, tz), anchor)
            }
            TimePeriod::Current => {
                let start = self.duration.floor(now, tz);
                let end = self
                    .duration
                    .shift(start, tz, 1)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                DateRange::new(start, end)
            }
            TimePeriod::Previous => {
                let end = self.duration.floor(now, tz);
                DateRange::new(self.back(end, tz), end)
            }
        };
        FixedTimeClause {
            reference: self.reference.clone(),
            ranges: vec![range],
        }
    }

    fn back(&self, end: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        self.duration
            .shift(end, tz, -1)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A filter predicate on a single dimension
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    String(StringClause),
    Boolean(BooleanClause),
    Number(NumberClause),
    FixedTime(FixedTimeClause),
    RelativeTime(RelativeTimeClause),
}

impl Clause {
    /// Name of the dimension this clause filters
    pub fn reference(&self) -> &str {
        match self {
            Clause::String(c) => &c.reference,
            Clause::Boolean(c) => &c.reference,
            Clause::Number(c) => &c.reference,
            Clause::FixedTime(c) => &c.reference,
            Clause::RelativeTime(c) => &c.reference,
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(self, Clause::FixedTime(_) | Clause::RelativeTime(_))
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Clause::RelativeTime(_))
    }

    /// Resolve relative time clauses against a time source; other clauses
    /// are returned unchanged
    pub fn evaluate(&self, now: DateTime<Utc>, max_time: Option<DateTime<Utc>>, tz: Tz) -> Clause {
        match self {
            Clause::RelativeTime(relative) => {
                Clause::FixedTime(relative.evaluate(now, max_time, tz))
            }
            other => other.clone(),
        }
    }

    /// Reject clauses that are still being edited or cannot run
    pub fn validate(&self) -> Result<(), ClauseError> {
        let empty = || ClauseError::Empty {
            reference: self.reference().to_string(),
        };
        match self {
            Clause::String(c) if c.values.is_empty() => Err(empty()),
            Clause::String(c) if c.action == StringAction::Match && c.values.len() > 1 => {
                Err(ClauseError::MultiplePatterns {
                    reference: c.reference.clone(),
                    count: c.values.len(),
                })
            }
            Clause::String(c) if c.action == StringAction::Match => {
                compile_pattern(c).map(|_| ())
            }
            Clause::Boolean(c) if c.values.is_empty() => Err(empty()),
            Clause::Number(c) if c.ranges.is_empty() => Err(empty()),
            Clause::FixedTime(c) if c.ranges.is_empty() => Err(empty()),
            _ => Ok(()),
        }
    }

    /// Build the client-side row test for this clause
    pub fn predicate(&self) -> Result<ClausePredicate, ClauseError> {
        self.validate()?;
        let (test, not) = match self {
            Clause::String(c) => {
                let test = match c.action {
                    StringAction::In => ValueTest::In(c.values.clone()),
                    StringAction::Contains => {
                        ValueTest::Contains(c.values.iter().map(|v| v.to_lowercase()).collect())
                    }
                    StringAction::Match => ValueTest::Match(compile_pattern(c)?),
                };
                (test, c.not)
            }
            Clause::Boolean(c) => (ValueTest::Boolean(c.values.clone()), c.not),
            Clause::Number(c) => (ValueTest::Number(c.ranges.clone()), c.not),
            Clause::FixedTime(c) => (ValueTest::Time(c.ranges.clone()), false),
            Clause::RelativeTime(c) => {
                return Err(ClauseError::Unevaluated {
                    reference: c.reference.clone(),
                })
            }
        };
        Ok(ClausePredicate { test, not })
    }
}

/// Compile the single pattern of a MATCH clause, as checked by `validate`
fn compile_pattern(clause: &StringClause) -> Result<Regex, ClauseError> {
    let pattern = clause.values.iter().next().map(String::as_str).unwrap_or("");
    Regex::new(pattern).map_err(|e| ClauseError::InvalidPattern {
        reference: clause.reference.clone(),
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePeriod::Current => write!(f, "current"),
            TimePeriod::Previous => write!(f, "previous"),
            TimePeriod::Latest => write!(f, "latest"),
        }
    }
}

// ============================================================================
// Client-side predicates
// ============================================================================

/// A single cell value as seen by a predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterValue<'a> {
    String(&'a str),
    Bool(bool),
    Number(f64),
    Time(DateTime<Utc>),
    Null,
}

#[derive(Debug, Clone)]
enum ValueTest {
    In(BTreeSet<String>),
    Contains(Vec<String>),
    Match(Regex),
    Boolean(BTreeSet<BooleanValue>),
    Number(Vec<NumberRange>),
    Time(Vec<DateRange>),
}

/// Compiled row test produced by [`Clause::predicate`]
#[derive(Debug, Clone)]
pub struct ClausePredicate {
    test: ValueTest,
    not: bool,
}

impl ClausePredicate {
    pub fn matches(&self, value: FilterValue<'_>) -> bool {
        let hit = match (&self.test, value) {
            (ValueTest::In(values), FilterValue::String(s)) => values.contains(s),
            (ValueTest::Contains(needles), FilterValue::String(s)) => {
                let haystack = s.to_lowercase();
                needles.iter().any(|n| haystack.contains(n.as_str()))
            }
            (ValueTest::Match(regex), FilterValue::String(s)) => regex.is_match(s),
            (ValueTest::Boolean(values), FilterValue::Bool(b)) => {
                values.contains(&BooleanValue::Bool(b))
                    || values.contains(&BooleanValue::Text(b.to_string()))
            }
            (ValueTest::Boolean(values), FilterValue::String(s)) => {
                values.contains(&BooleanValue::Text(s.to_string()))
                    || s.parse::<bool>()
                        .map(|b| values.contains(&BooleanValue::Bool(b)))
                        .unwrap_or(false)
            }
            (ValueTest::Boolean(values), FilterValue::Null) => {
                values.contains(&BooleanValue::Text("null".to_string()))
            }
            (ValueTest::Number(ranges), FilterValue::Number(n)) => {
                ranges.iter().any(|r| r.contains(n))
            }
            (ValueTest::Time(ranges), FilterValue::Time(t)) => ranges.iter().any(|r| r.contains(t)),
            _ => false,
        };
        hit != self.not
    }
}
