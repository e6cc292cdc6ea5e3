//! Explicit source of "now" and of the max ingested time per cube

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// A frozen view of the clock.
///
/// Callers build one per query round. Cubes without a recorded max time
/// fall back to `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timekeeper {
    now: DateTime<Utc>,
    max_times: HashMap<String, DateTime<Utc>>,
}

impl Timekeeper {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            max_times: HashMap::new(),
        }
    }

    /// Timekeeper frozen at the current system time
    pub fn at_system_time() -> Self {
        Self::new(Utc::now())
    }

    /// Record the max ingested time of a cube
    pub fn with_max_time(mut self, data_cube: impl Into<String>, max_time: DateTime<Utc>) -> Self {
        self.max_times.insert(data_cube.into(), max_time);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn max_time(&self, data_cube: &str) -> Option<DateTime<Utc>> {
        self.max_times.get(data_cube).copied()
    }
}
