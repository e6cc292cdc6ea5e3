//! Comparison period offset

use chrono_tz::Tz;
use std::fmt;

use crate::filter::{Clause, Filter};
use crate::time::{Duration, TimeError};

/// How far back the comparison period lies. Empty means no comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeShift(Option<Duration>);

impl TimeShift {
    pub fn empty() -> Self {
        TimeShift(None)
    }

    pub fn new(duration: Duration) -> Self {
        TimeShift(Some(duration))
    }

    /// Parse the serialized form; the empty string is no comparison
    pub fn parse(value: &str) -> Result<Self, TimeError> {
        if value.is_empty() {
            return Ok(TimeShift::empty());
        }
        Ok(TimeShift::new(value.parse()?))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn value(&self) -> Option<&Duration> {
        self.0.as_ref()
    }

    /// Collapse to empty when the shifted period would overlap the filtered one.
    ///
    /// Fixed clauses are checked against the hull of their ranges, relative
    /// clauses against the nominal length of their duration. A shift that
    /// moves the hull out of the representable range is dropped too. Without
    /// a time clause there is nothing to overlap with.
    pub fn constrain_to_filter(&self, filter: &Filter, tz: Tz) -> TimeShift {
        let Some(shift) = self.0 else {
            return *self;
        };
        let valid = match filter.iter().find(|c| c.is_time()) {
            Some(Clause::FixedTime(clause)) => {
                let start = clause.ranges.iter().map(|r| r.start).min();
                let end = clause.ranges.iter().map(|r| r.end).max();
                match (start, end) {
                    (Some(start), Some(end)) => shift
                        .shift(end, tz, -1)
                        .map_or(false, |shifted_end| shifted_end <= start),
                    _ => true,
                }
            }
            Some(Clause::RelativeTime(clause)) => {
                shift.approximate_millis() >= clause.duration.approximate_millis()
            }
            _ => true,
        };
        if valid {
            *self
        } else {
            tracing::debug!(shift = %shift, "time shift overlaps the time filter, dropping it");
            TimeShift::empty()
        }
    }
}

impl fmt::Display for TimeShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(duration) => write!(f, "{}", duration),
            None => Ok(()),
        }
    }
}
